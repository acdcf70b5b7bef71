//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use weaver_split_browser::ThemePalette;
use weaver_split_browser::color::parse_hex_color;

/// Palette as CSS hex strings (`#rgb`, `#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsThemePalette {
    pub background: String,
    pub solid: String,
    pub scrollbar_thumb: String,
}

impl JsThemePalette {
    pub fn to_palette(&self) -> Result<ThemePalette, JsError> {
        let parse = |field: &str, value: &str| {
            parse_hex_color(value)
                .ok_or_else(|| JsError::new(&format!("Invalid {} color: {:?}", field, value)))
        };
        Ok(ThemePalette {
            background: parse("background", &self.background)?,
            solid: parse("solid", &self.solid)?,
            scrollbar_thumb: parse("scrollbarThumb", &self.scrollbar_thumb)?,
        })
    }
}
