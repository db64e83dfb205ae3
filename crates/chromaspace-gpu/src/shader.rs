//! Composes scene shaders from named fragments.
//!
//! Every scene program shares one template with three splice points: the
//! helper functions, the embedding applied in the vertex stage, and the
//! shading applied in the fragment stage. Layout fragments fill the second,
//! everything else the third, in the order given, so a composed layout runs
//! its steps one after another on `pos`.

use chromaspace_core::ShaderFragment;
use chromaspace_core::embedding::ShaderBuilder;

const SCENE_TEMPLATE: &str = include_str!("../shaders/scene.wgsl");
const FUNCTIONS: &[&str] = &[
    include_str!("../shaders/functions.wgsl"),
    include_str!("../shaders/oklab.wgsl"),
];

const FUNCTIONS_MARKER: &str = "// FUNCTIONS";
const EMBED_MARKER: &str = "// EMBED";
const SHADE_MARKER: &str = "// SHADE";

/// Builds WGSL source for a fragment list.
#[derive(Debug, Clone, Copy)]
pub struct WgslComposer {
    template: &'static str,
    functions: &'static [&'static str],
}

impl Default for WgslComposer {
    fn default() -> Self {
        Self {
            template: SCENE_TEMPLATE,
            functions: FUNCTIONS,
        }
    }
}

impl WgslComposer {
    /// Statement spliced in for one fragment.
    ///
    /// The embed stage works on `pos`; the shade stage on `color` and
    /// `alpha`, with `coord` holding the pre-embedding coordinate.
    fn snippet(fragment: ShaderFragment) -> &'static str {
        match fragment {
            ShaderFragment::Cartesian => "",
            ShaderFragment::Cylindrical => "pos = cylindrical_to_cartesian(pos);",
            ShaderFragment::Oklab => "pos = srgb_to_oklab(pos);",
            ShaderFragment::SwapXY => "pos = pos.yxz;",
            ShaderFragment::SwapXZ => "pos = pos.zyx;",
            ShaderFragment::SwapYZ => "pos = pos.xzy;",
            ShaderFragment::Srgb => "",
            // Coordinates are (h, v, s) and (h, l, s).
            ShaderFragment::Hsv => "color = hsv2rgb(color.xzy);",
            ShaderFragment::Okhsv => "color = okhsv2rgb(color.xzy);",
            ShaderFragment::Okhsl => "color = okhsl2rgb(color.xzy);",
            ShaderFragment::Pick => "color = coord;\n    alpha = u.tag.x;",
            ShaderFragment::Flat => "color = u.tint.rgb;\n    alpha = u.tint.a;",
        }
    }
}

impl ShaderBuilder for WgslComposer {
    type Output = String;

    fn build(&self, fragments: &[ShaderFragment]) -> String {
        let mut embed = Vec::new();
        let mut shade = Vec::new();
        for &fragment in fragments {
            let snippet = Self::snippet(fragment);
            if snippet.is_empty() {
                continue;
            }
            if fragment.is_layout() {
                embed.push(snippet);
            } else {
                shade.push(snippet);
            }
        }
        self.template
            .replacen(FUNCTIONS_MARKER, &self.functions.join("\n"), 1)
            .replacen(EMBED_MARKER, &embed.join("\n    "), 1)
            .replacen(SHADE_MARKER, &shade.join("\n    "), 1)
    }
}

/// Label used for the shader module and pipeline built from `fragments`.
pub fn program_label(fragments: &[ShaderFragment]) -> String {
    let ids: Vec<&str> = fragments.iter().map(|f| f.id()).collect();
    format!("chromaspace_scene[{}]", ids.join("+"))
}
