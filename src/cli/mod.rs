pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wavelift",
    version,
    about = "Wavelift - put boat trailer photos in the water",
    long_about = r#"Wavelift - put boat trailer photos in the water

Turn photos of boats on trailers into magazine-quality shots of the boats
floating in a waterway of your choice, powered by OpenAI image models.
Run `serve` for the web upload page, or `transform` for batch processing
straight from the terminal.

SETUP:
  Set your API key via environment variable or config:
    export OPENAI_API_KEY=your-key-here
    wavelift config set api.key your-key-here

EXAMPLES:
  Run the web app:
    wavelift serve
    wavelift serve --port 8080

  Transform photos from the terminal:
    wavelift transform boat1.jpg boat2.jpg --location "Miami Marina"
    wavelift transform *.jpg -l "Lake Tahoe" -d "Sunset Yacht Sales"

  Manage configuration:
    wavelift config show
    wavelift config set output.directory ~/Pictures/wavelift"#,
    after_help = r#"CONFIGURATION:
  Config file: ~/.config/wavelift/config.toml (macOS/Linux)

  Models:
    - dall-e-2 edits the uploaded photo in place (primary mode)
    - dall-e-3 synthesizes the scene from scratch (fallback mode)

  Output size is fixed at 1024x1024; fallback generation uses hd quality."#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server with the upload page and transform API
    ///
    /// Serves the static frontend and POST /transform. Fails at startup
    /// when no API key is configured.
    #[command(
        alias = "s",
        after_help = r#"EXAMPLES:
  Defaults (127.0.0.1:3000):
    wavelift serve

  Custom bind address:
    wavelift serve --host 0.0.0.0 --port 8080"#
    )]
    Serve(commands::serve::ServeArgs),

    /// Transform boat photos from the command line
    ///
    /// Processes the given files one at a time, in order, and downloads the
    /// results. Files that fail are logged and skipped; the batch continues.
    #[command(
        alias = "t",
        after_help = r#"EXAMPLES:
  Single photo:
    wavelift transform boat.jpg --location "Miami Marina"

  Batch with dealership branding:
    wavelift transform photos/*.jpg -l "Caribbean waters" -d "Sunset Yacht Sales"

  Keep the URLs without downloading:
    wavelift transform boat.jpg -l "Lake Tahoe" --no-download --format json"#
    )]
    Transform(commands::transform::TransformArgs),

    /// View or modify configuration
    ///
    /// Manage the API key, model choices, server binding, and output
    /// settings. Changes are saved to the config file immediately.
    #[command(
        alias = "c",
        after_help = r#"EXAMPLES:
  Show all settings:
    wavelift config show

  Set values:
    wavelift config set api.key YOUR_API_KEY
    wavelift config set server.port 8080

  Show config file path:
    wavelift config path

AVAILABLE SETTINGS:
  api.key              - OpenAI API key
  api.base_url         - API base URL
  api.edit_model       - Edit-mode model (default dall-e-2)
  api.generate_model   - Fallback model (default dall-e-3)
  defaults.size        - Output resolution
  defaults.quality     - Fallback generation quality (standard/hd)
  server.host          - Bind address
  server.port          - Bind port
  server.static_dir    - Frontend asset directory
  output.directory     - Where the CLI saves results
  output.auto_download - Download results automatically (true/false)"#
    )]
    Config(commands::config::ConfigArgs),
}
