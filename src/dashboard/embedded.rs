//! Dashboard assets compiled into the binary.

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/dashboard/"]
pub struct Assets;
