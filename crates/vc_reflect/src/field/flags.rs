use bitflags::bitflags;

bitflags! {
    /// Role flags of a field.
    ///
    /// Only [`STATE`](FieldFlags::STATE) fields are persisted. The other flags
    /// are carried as metadata and used as filter masks by
    /// [`TypeReflector::to_string`](crate::TypeReflector::to_string).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// Part of the persisted state of the instance.
        const STATE = 1;
        /// A configuration value, settable from text.
        const CONFIG = 1 << 1;
        /// Must be present in any stored layout this class is read from.
        const MANDATORY = 1 << 2;
    }
}

impl FieldFlags {
    /// Returns `true` if the field is written and read by the archive.
    #[inline]
    pub const fn is_persisted(self) -> bool {
        self.contains(Self::STATE)
    }
}
