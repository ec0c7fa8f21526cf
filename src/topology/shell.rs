use super::face::FaceId;

slotmap::new_key_type! {
    /// Unique identifier for a shell of a solid.
    pub struct ShellId;
}

/// Role of a shell within its solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// Bounds material from outside; normals point away from the material.
    Outer,
    /// Bounds an internal cavity; normals point into the cavity.
    Void,
}

/// Data associated with a topological shell.
///
/// A shell is an edge-connected, closed set of faces.
#[derive(Debug, Clone)]
pub struct ShellData {
    /// The faces that make up this shell.
    pub faces: Vec<FaceId>,
    /// Whether the shell is an outer boundary or a cavity.
    pub kind: ShellKind,
}
