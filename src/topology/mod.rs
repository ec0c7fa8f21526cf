pub mod builder;
pub mod edge;
pub mod face;
pub mod face_loop;
pub mod half_edge;
mod merge;
pub mod query;
pub mod shell;
pub mod vertex;
pub mod weld;

pub use builder::{PolygonFace, SolidBuilder};
pub use edge::{EdgeData, EdgeId};
pub use face::{FaceData, FaceId, FaceKind};
pub use face_loop::{LoopData, LoopId};
pub use half_edge::{HalfEdgeData, HalfEdgeId};
pub use query::FacePolygon;
pub use shell::{ShellData, ShellId, ShellKind};
pub use vertex::{VertexData, VertexId};

use crate::error::TopologyError;
use slotmap::SlotMap;

/// A boundary-represented solid that owns all of its topological entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation. A solid
/// has one outer shell, any number of void shells (cavities), and any number
/// of further outer shells (`lumps`) when it is a compound of disjoint pieces.
///
/// Solids are produced by [`SolidBuilder`], the creation operations, and the
/// boolean and blend operations. Operations never modify their inputs.
#[derive(Debug, Clone, Default)]
pub struct Solid {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    half_edges: SlotMap<HalfEdgeId, HalfEdgeData>,
    loops: SlotMap<LoopId, LoopData>,
    faces: SlotMap<FaceId, FaceData>,
    shells: SlotMap<ShellId, ShellData>,
    outer_shell: ShellId,
    void_shells: Vec<ShellId>,
    lumps: Vec<ShellId>,
}

impl Solid {
    // --- Shell structure ---

    /// The primary outer shell.
    #[must_use]
    pub fn outer_shell(&self) -> ShellId {
        self.outer_shell
    }

    /// Shells bounding internal cavities.
    #[must_use]
    pub fn void_shells(&self) -> &[ShellId] {
        &self.void_shells
    }

    /// Additional outer shells of a compound solid.
    #[must_use]
    pub fn lumps(&self) -> &[ShellId] {
        &self.lumps
    }

    /// All shells: the outer shell, then lumps, then voids.
    #[must_use]
    pub fn all_shells(&self) -> Vec<ShellId> {
        std::iter::once(self.outer_shell)
            .chain(self.lumps.iter().copied())
            .chain(self.void_shells.iter().copied())
            .collect()
    }

    /// Returns `true` if the solid consists of more than one disjoint piece.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        !self.lumps.is_empty()
    }

    pub(crate) fn set_shell_roles(
        &mut self,
        outer: ShellId,
        lumps: Vec<ShellId>,
        voids: Vec<ShellId>,
    ) {
        self.outer_shell = outer;
        self.lumps = lumps;
        self.void_shells = voids;
    }

    // --- Counts ---

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    // --- Iteration ---

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    pub fn half_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdgeData)> {
        self.half_edges.iter()
    }

    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }

    pub fn shells(&self) -> impl Iterator<Item = (ShellId, &ShellData)> {
        self.shells.iter()
    }

    // --- Vertex operations ---

    pub(crate) fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the solid.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    // --- Edge operations ---

    pub(crate) fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the solid.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    // --- Half-edge operations ---

    pub(crate) fn add_half_edge(&mut self, data: HalfEdgeData) -> HalfEdgeId {
        self.half_edges.insert(data)
    }

    /// Returns a reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the solid.
    pub fn half_edge(&self, id: HalfEdgeId) -> Result<&HalfEdgeData, TopologyError> {
        self.half_edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("half-edge".into()))
    }

    pub(crate) fn half_edge_mut(
        &mut self,
        id: HalfEdgeId,
    ) -> Result<&mut HalfEdgeData, TopologyError> {
        self.half_edges
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("half-edge".into()))
    }

    // --- Loop operations ---

    pub(crate) fn add_loop(&mut self, data: LoopData) -> LoopId {
        self.loops.insert(data)
    }

    /// Returns a reference to the loop data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the solid.
    pub fn face_loop(&self, id: LoopId) -> Result<&LoopData, TopologyError> {
        self.loops
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("loop".into()))
    }

    pub(crate) fn face_loop_mut(&mut self, id: LoopId) -> Result<&mut LoopData, TopologyError> {
        self.loops
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("loop".into()))
    }

    // --- Face operations ---

    pub(crate) fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the solid.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    pub(crate) fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData, TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    // --- Shell operations ---

    pub(crate) fn add_shell(&mut self, data: ShellData) -> ShellId {
        self.shells.insert(data)
    }

    /// Returns a reference to the shell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the solid.
    pub fn shell(&self, id: ShellId) -> Result<&ShellData, TopologyError> {
        self.shells
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))
    }

    pub(crate) fn shell_mut(&mut self, id: ShellId) -> Result<&mut ShellData, TopologyError> {
        self.shells
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))
    }
}
