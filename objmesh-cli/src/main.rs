//! objmesh - load Wavefront OBJ meshes and report what the renderer would get
//!
//! Set `RUST_LOG=debug` for parser detail.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;
use objmesh_core::Mesh;

#[derive(Parser)]
#[command(name = "objmesh")]
#[command(version, about = "Inspect Wavefront OBJ meshes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a mesh, optionally pose it, and print a summary.
    Inspect {
        /// Path to the .obj file.
        path: PathBuf,

        /// Translation applied after rotation.
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        offset: Option<Vec<f32>>,

        /// Roll, pitch and yaw in radians.
        #[arg(long, num_args = 3, value_names = ["ROLL", "PITCH", "YAW"], allow_negative_numbers = true)]
        rotate: Option<Vec<f32>>,

        /// Number of assembled vertices to print.
        #[arg(short, long, default_value_t = 0)]
        show: usize,
    },

    /// Parse a mesh and report only whether it loads.
    Check {
        /// Paths to .obj files.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn to_triple(values: Option<Vec<f32>>) -> Option<[f32; 3]> {
    values.map(|v| [v[0], v[1], v[2]])
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            path,
            offset,
            rotate,
            show,
        } => match objmesh_cli::inspect(&path, to_triple(offset), to_triple(rotate), show) {
            Ok(summary) => {
                print!("{summary}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        },
        Commands::Check { paths } => {
            let mut failed = 0;
            for path in &paths {
                match Mesh::from_path(path) {
                    Ok(mesh) => println!(
                        "ok    {} ({} triangles)",
                        path.display(),
                        mesh.triangle_count()
                    ),
                    Err(e) => {
                        println!("fail  {}: {e}", path.display());
                        failed += 1;
                    }
                }
            }
            if failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
