//! Shader programs compiled once and shared by every actor

use crate::error::GpuError;
use crate::gfx::gpu::{GpuContext, ProgramHandle, ProgramKind};

/// One handle per [`ProgramKind`], created at startup
///
/// Wrap in an `Rc` and hand a clone to each actor; the library outlives
/// every actor that references it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderLibrary {
    programs: Vec<(ProgramKind, ProgramHandle)>,
}

impl ShaderLibrary {
    pub fn new(gpu: &mut dyn GpuContext) -> Result<Self, GpuError> {
        let mut programs = Vec::with_capacity(ProgramKind::ALL.len());
        for kind in ProgramKind::ALL {
            let handle = gpu.create_program(kind)?;
            log::debug!("Created program {} ({:?})", kind.label(), handle);
            programs.push((kind, handle));
        }
        Ok(Self { programs })
    }

    /// Handle of the program compiled for `kind`
    pub fn program(&self, kind: ProgramKind) -> ProgramHandle {
        self.programs
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, handle)| *handle)
            // Every kind is inserted by `new`.
            .unwrap_or(ProgramHandle(0))
    }

    pub fn handles(&self) -> impl Iterator<Item = ProgramHandle> + '_ {
        self.programs.iter().map(|(_, handle)| *handle)
    }

    /// Releases every program
    pub fn release(&self, gpu: &mut dyn GpuContext) {
        for handle in self.handles() {
            gpu.release_program(handle);
        }
    }
}

/// Program variants an actor switches between while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSet {
    pub solid: ProgramKind,
    pub solid_flat: ProgramKind,
    pub nolight_solid: ProgramKind,
    pub wireframe: ProgramKind,
    pub nolight_wireframe: ProgramKind,
}

impl ShaderSet {
    /// Phong-lit shapes
    pub const LIT: ShaderSet = ShaderSet {
        solid: ProgramKind::Phong,
        solid_flat: ProgramKind::PhongFlat,
        nolight_solid: ProgramKind::UniformMaterial,
        wireframe: ProgramKind::WireframeMaterial,
        nolight_wireframe: ProgramKind::UniformMaterial,
    };

    pub const GRID: ShaderSet = ShaderSet::uniform(ProgramKind::UniformMaterial);
    pub const AXIS: ShaderSet = ShaderSet::uniform(ProgramKind::AttributeColor);
    pub const BACKGROUND: ShaderSet = ShaderSet::uniform(ProgramKind::Background);

    /// Same program for every variant
    pub const fn uniform(kind: ProgramKind) -> Self {
        Self {
            solid: kind,
            solid_flat: kind,
            nolight_solid: kind,
            wireframe: kind,
            nolight_wireframe: kind,
        }
    }

    /// Every distinct program of the set
    pub fn distinct(&self) -> Vec<ProgramKind> {
        let mut kinds = Vec::with_capacity(5);
        for kind in [
            self.solid,
            self.solid_flat,
            self.nolight_solid,
            self.wireframe,
            self.nolight_wireframe,
        ] {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }

    /// Chooses the program for a lighting state, edge pass and shading
    pub fn select(&self, lighting: bool, wireframe: bool, flat: bool) -> ProgramKind {
        match (lighting, wireframe) {
            (true, true) => self.wireframe,
            (true, false) if flat => self.solid_flat,
            (true, false) => self.solid,
            (false, true) => self.nolight_wireframe,
            (false, false) => self.nolight_solid,
        }
    }
}

impl Default for ShaderSet {
    fn default() -> Self {
        Self::LIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::gpu::{CommandRecorder, GpuCommand};

    #[test]
    fn every_program_is_created_once() {
        let mut gpu = CommandRecorder::new();
        let library = ShaderLibrary::new(&mut gpu).unwrap();

        let created = gpu
            .commands()
            .iter()
            .filter(|c| matches!(c, GpuCommand::CreateProgram(..)))
            .count();
        assert_eq!(created, ProgramKind::ALL.len());

        for kind in ProgramKind::ALL {
            assert_eq!(gpu.program_kind(library.program(kind)), Some(kind));
        }
    }

    #[test]
    fn lit_set_selects_by_state() {
        let set = ShaderSet::LIT;
        assert_eq!(set.select(true, false, false), ProgramKind::Phong);
        assert_eq!(set.select(true, false, true), ProgramKind::PhongFlat);
        assert_eq!(set.select(true, true, true), ProgramKind::WireframeMaterial);
        assert_eq!(set.select(false, false, true), ProgramKind::UniformMaterial);
        assert_eq!(set.select(false, true, false), ProgramKind::UniformMaterial);
        assert_eq!(set.distinct().len(), 4);
    }

    #[test]
    fn uniform_sets_collapse_to_one_program() {
        assert_eq!(ShaderSet::AXIS.distinct(), vec![ProgramKind::AttributeColor]);
        assert_eq!(
            ShaderSet::BACKGROUND.select(false, true, true),
            ProgramKind::Background
        );
    }
}
