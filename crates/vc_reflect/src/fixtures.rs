//! Classes shared by the unit tests.

use crate::{
    ClassInfo, ClassSchema, MemorySchemaProvider, Poly, StaticClass, TypeRegistry, impl_class,
};

// -----------------------------------------------------------------------------
// Plain classes

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl_class! {
    Vec2 as "Vec2" version 1 {
        auto_register: true,
    }
    fields {
        x: f32 [STATE],
        y: f32 [STATE],
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Entity {
    pub id: u64,
    pub name: String,
    pub scratch: u32,
}

impl_class! {
    Entity as "Entity" version 1 {
        uuid: 0x5f0e_9d27_3c41_4e55_8a4e_6b1d_0c9e_2a71,
    }
    fields {
        id: u64 [STATE | MANDATORY],
        name: String [STATE | CONFIG] "--name" "Display name",
        scratch: u32 [CONFIG] "--scratch",
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Player {
    pub base: Entity,
    pub score: i32,
    pub alive: bool,
    pub position: Vec2,
    pub tags: Vec<String>,
    pub history: Vec<Vec2>,
}

impl_class! {
    Player as "Player" version 2 {
        base: Entity => base,
    }
    fields {
        score: i32 [STATE | CONFIG] "-s" "Current score",
        alive: bool [STATE | CONFIG],
        position: Vec2 [STATE],
        tags: Vec<String> [STATE],
        history: Vec<Vec2> [STATE],
    }
}

pub fn player() -> Player {
    Player {
        base: Entity {
            id: 42,
            name: "alice".into(),
            scratch: 9,
        },
        score: -7,
        alive: true,
        position: Vec2 { x: 1.5, y: -2.0 },
        tags: vec!["red".into(), "fast".into()],
        history: vec![Vec2 { x: 0.0, y: 0.0 }, Vec2 { x: 1.0, y: 0.5 }],
    }
}

// -----------------------------------------------------------------------------
// Polymorphic classes

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Shape {
    pub label: String,
}

impl_class! {
    Shape as "Shape" version 1 {}
    fields {
        label: String [STATE],
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Circle {
    pub base: Shape,
    pub radius: f64,
}

impl_class! {
    Circle as "Circle" version 1 {
        base: Shape => base,
    }
    fields {
        radius: f64 [STATE],
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Square {
    pub base: Shape,
    pub side: u16,
}

impl_class! {
    Square as "Square" version 1 {
        base: Shape => base,
    }
    fields {
        side: u16 [STATE],
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    pub title: String,
    pub focus: Poly<Shape>,
    pub shapes: Vec<Poly<Shape>>,
}

impl_class! {
    Scene as "Scene" version 1 {}
    fields {
        title: String [STATE],
        focus: Poly<Shape> [STATE],
        shapes: Vec<Poly<Shape>> [STATE],
    }
}

pub fn circle(label: &str, radius: f64) -> Poly<Shape> {
    let circle = Circle {
        base: Shape { label: label.into() },
        radius,
    };
    Poly::new(circle).unwrap()
}

pub fn square(label: &str, side: u16) -> Poly<Shape> {
    let square = Square {
        base: Shape { label: label.into() },
        side,
    };
    Poly::new(square).unwrap()
}

pub fn scene() -> Scene {
    Scene {
        title: "demo".into(),
        focus: circle("sun", 3.5),
        shapes: vec![square("box", 4), circle("dot", 0.25)],
    }
}

// -----------------------------------------------------------------------------
// Versioned layouts of one class

/// `Record` as first shipped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordV1 {
    pub a: u32,
    pub b: String,
}

impl_class! {
    RecordV1 as "Record" version 1 {}
    fields {
        a: u32 [STATE],
        b: String [STATE],
    }
}

/// `Record` after gaining a field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordV2 {
    pub a: u32,
    pub b: String,
    pub c: Vec<Vec2>,
}

impl_class! {
    RecordV2 as "Record" version 2 {}
    fields {
        a: u32 [STATE],
        b: String [STATE],
        c: Vec<Vec2> [STATE],
    }
}

/// `Record` with its fields reordered, `b` retyped and `a` mandatory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordV3 {
    pub c: Vec<Vec2>,
    pub a: u32,
    pub b: u64,
}

impl_class! {
    RecordV3 as "Record" version 3 {}
    fields {
        c: Vec<Vec2> [STATE],
        a: u32 [STATE | MANDATORY],
        b: u64 [STATE],
    }
}

// -----------------------------------------------------------------------------
// A field name declared by a class and by its base

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Layer {
    pub v: u32,
}

impl_class! {
    Layer as "Layer" version 1 {}
    fields {
        v: u32 [STATE | MANDATORY],
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StackV1 {
    pub base: Layer,
    pub v: u32,
}

impl_class! {
    StackV1 as "Stack" version 1 {
        base: Layer => base,
    }
    fields {
        v: u32 [STATE],
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StackV2 {
    pub base: Layer,
    pub v: u32,
    pub w: u16,
}

impl_class! {
    StackV2 as "Stack" version 2 {
        base: Layer => base,
    }
    fields {
        v: u32 [STATE],
        w: u16 [STATE],
    }
}

// -----------------------------------------------------------------------------
// Nested sequences

/// `Grid` before it stored any cells.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GridV1 {
    pub name: String,
}

impl_class! {
    GridV1 as "Grid" version 1 {}
    fields {
        name: String [STATE],
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Grid {
    pub name: String,
    pub cells: Vec<Vec<Vec2>>,
    pub heights: Vec<Vec<u8>>,
}

impl_class! {
    Grid as "Grid" version 2 {}
    fields {
        name: String [STATE],
        cells: Vec<Vec<Vec2>> [STATE],
        heights: Vec<Vec<u8>> [STATE],
    }
}

pub fn grid() -> Grid {
    let cell = |x: f32, y: f32| Vec2 { x, y };
    Grid {
        name: "map".into(),
        cells: vec![
            vec![cell(0.0, 0.0), cell(1.0, 0.0)],
            Vec::new(),
            vec![cell(0.5, 2.0), cell(1.5, 2.0), cell(2.5, 2.0)],
        ],
        heights: vec![vec![1, 2], vec![], vec![3]],
    }
}

// -----------------------------------------------------------------------------
// Helpers

/// A registry with all non-versioned fixture classes.
pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register_class::<Vec2>();
    registry.register_class::<Entity>();
    registry.register_class::<Player>();
    registry.register_class::<Shape>();
    registry.register_class::<Circle>();
    registry.register_class::<Square>();
    registry.register_class::<Scene>();
    registry
}

/// A provider holding the current schema of each class.
pub fn schemas_of(classes: &[&'static ClassInfo]) -> MemorySchemaProvider {
    let mut provider = MemorySchemaProvider::new();
    for &class in classes {
        provider.insert(&ClassSchema::of(class)).unwrap();
    }
    provider
}

/// The current schema of `C`.
pub fn schema<C: StaticClass>() -> ClassSchema {
    ClassSchema::of(C::static_class_info())
}
