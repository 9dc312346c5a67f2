use base64::Engine as _;
use trip::Mode;

/// 84x84 badge with the mode's glyph on a translucent white disc.
pub fn icon_svg(mode: Mode) -> String {
    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='84' height='84' viewBox='0 0 84 84'>\
<circle cx='42' cy='42' r='28' fill='#ffffff' fill-opacity='0.94' stroke='#d7dbe2' stroke-width='1.25'/>\
<text x='42' y='42' text-anchor='middle' dominant-baseline='central' font-size='28'>{}</text>\
</svg>",
        mode.glyph()
    )
}

/// Billboard image URI for a vehicle of `mode`.
pub fn vehicle_icon(mode: Mode) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(icon_svg(mode));
    format!("data:image/svg+xml;base64,{encoded}")
}
