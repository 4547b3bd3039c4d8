use courier_orders::{decode_dimensions, encode_complete, encode_dimensions};
use serde_json::json;

use super::{DimensionsCommand, print_json};

pub fn dimensions(command: DimensionsCommand) -> anyhow::Result<()> {
    match command {
        DimensionsCommand::Encode {
            length,
            width,
            height,
            complete,
        } => {
            let blob = if complete {
                encode_complete(
                    length.unwrap_or(0.0),
                    width.unwrap_or(0.0),
                    height.unwrap_or(0.0),
                )?
            } else {
                encode_dimensions(length, width, height)?
            };
            println!("{blob}");
            Ok(())
        }
        DimensionsCommand::Decode { blob } => {
            let dimensions = decode_dimensions(&blob)?;
            print_json(&json!({
                "length": dimensions.length,
                "width": dimensions.width,
                "height": dimensions.height,
                "unit": dimensions.unit(),
                "volume": dimensions.volume(),
            }))
        }
    }
}
