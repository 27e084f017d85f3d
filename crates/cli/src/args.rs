use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use laminar_mesh::MemoryOrder;

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    pub mesh: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    pub input: PathBuf,

    /// Output path. The format is taken from the file name.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Per-vertex data to attach (FreeSurfer morph data, GIFTI or VTK).
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Data array to take from a GIFTI data file.
    #[arg(long, default_value_t = 0, requires = "data")]
    pub data_index: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Order {
    /// Row-major, last axis fastest.
    C,
    /// Column-major, first axis fastest.
    F,
}

impl From<Order> for MemoryOrder {
    fn from(o: Order) -> Self {
        match o {
            Order::C => MemoryOrder::RowMajor,
            Order::F => MemoryOrder::ColumnMajor,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct SampleArgs {
    pub mesh: PathBuf,

    /// Raw little-endian f32 volume.
    #[arg(long)]
    pub volume: PathBuf,

    /// Volume dimensions: nx ny nz, plus nt for a series.
    #[arg(long, num_args = 3..=4, required = true)]
    pub dims: Vec<usize>,

    /// Voxel spacing along x, y and z.
    #[arg(long, num_args = 3, default_values_t = [1.0, 1.0, 1.0])]
    pub spacing: Vec<f32>,

    /// Memory order of the raw volume.
    #[arg(long, value_enum, default_value_t = Order::F)]
    pub order: Order,

    /// Clamp vertices outside the volume to its edge instead of failing.
    #[arg(long)]
    pub clamp: bool,

    /// Output mesh carrying one data column per timepoint.
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log at info level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print a summary of a surface mesh.
    Info(InfoArgs),
    /// Convert a surface mesh between formats.
    Convert(ConvertArgs),
    /// Sample a volume at every vertex of a surface.
    Sample(SampleArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sample() {
        let args = Args::parse_from([
            "laminar", "sample", "lh.white", "--volume", "v.raw", "--dims", "4", "3", "2",
            "--spacing", "0.5", "0.5", "1", "--clamp", "-o", "out.vtk",
        ]);
        let Commands::Sample(s) = args.command else {
            panic!("expected sample");
        };
        assert_eq!(vec![4, 3, 2], s.dims);
        assert_eq!(vec![0.5, 0.5, 1.0], s.spacing);
        assert_eq!(Order::F, s.order);
        assert!(s.clamp);
    }

    #[test]
    fn data_index_needs_data() {
        assert!(Args::try_parse_from([
            "laminar", "convert", "a.vtk", "-o", "b.ply", "--data-index", "1"
        ])
        .is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
