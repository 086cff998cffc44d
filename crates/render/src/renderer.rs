use crate::error::RenderError;
use crate::plan::{Frame, Pass};
use umbra_scene::{Geometry, Scene};

/// Renderer-agnostic interface: consume a planned frame and the scene it
/// was planned from.
///
/// The scene is borrowed immutably. World matrices were already rebuilt by
/// the orchestrator and live in the frame's uniform images.
pub trait Renderer<G: Geometry> {
    /// The output type produced by this renderer.
    type Output;

    fn render(&mut self, frame: &Frame<'_>, scene: &Scene<G>) -> Result<Self::Output, RenderError>;
}

/// Human-readable dump of a frame plan, used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Print every draw's world-space origin.
    pub verbose: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl<G: Geometry> Renderer<G> for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, frame: &Frame<'_>, scene: &Scene<G>) -> Result<String, RenderError> {
        let plan = frame.plan;
        let mut out = String::new();
        let name = |index: usize| {
            scene
                .get(index)
                .map(|o| o.name.as_str())
                .unwrap_or("<missing>")
        };
        let origin = |world: glam::Mat4| {
            let p = world.w_axis;
            format!(" origin=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)
        };
        let l = plan.light_position;

        out.push_str(&format!(
            "=== frame {} (t={:.3}s) ===\n",
            plan.frame, plan.elapsed
        ));
        out.push_str(&format!("light: ({:.2}, {:.2}, {:.2})\n", l.x, l.y, l.z));

        for pass in &plan.passes {
            match pass {
                Pass::Shadow { draws } => {
                    out.push_str(&format!("shadow pass: {} draws\n", draws.len()));
                    for draw in draws {
                        out.push_str(&format!(
                            "  {} indices={} slot={}",
                            name(draw.object),
                            draw.index_count,
                            draw.slot.index()
                        ));
                        if self.verbose {
                            if let Some(block) = frame.shadow_uniforms.get(draw.slot) {
                                out.push_str(&origin(block.world_matrix()));
                            }
                        }
                        out.push('\n');
                    }
                }
                Pass::Main {
                    uniforms, draws, ..
                } => {
                    out.push_str(&format!(
                        "main pass: {} draws, mode {}\n",
                        draws.len(),
                        uniforms.mode[0]
                    ));
                    for draw in draws {
                        out.push_str(&format!(
                            "  {} indices={} slot={}",
                            name(draw.object),
                            draw.index_count,
                            draw.slot.index()
                        ));
                        if self.verbose {
                            if let Some(block) = frame.draw_uniforms.get(draw.slot) {
                                out.push_str(&origin(block.world_matrix()));
                            }
                        }
                        out.push('\n');
                    }
                }
                Pass::Debug { view } => {
                    out.push_str(&format!("debug pass: shadow map {}\n", view.label()));
                }
            }
        }

        Ok(out)
    }
}
