use std::path::Path;

use anyhow::{bail, Context};
use byteorder::{LittleEndian, ReadBytesExt};
use laminar_io::{load_geometry, save_geometry};
use laminar_mesh::MemoryOrder;
use laminar_sampling::{generate_profiles, BoundsPolicy, Volume};

use crate::args;

pub fn sample_command(args: args::SampleArgs) -> anyhow::Result<()> {
    let spacing = [args.spacing[0], args.spacing[1], args.spacing[2]];
    let volume = read_raw_volume(&args.volume, &args.dims, spacing, args.order.into())?;
    let mesh = load_geometry(args.mesh.as_path())
        .with_context(|| format!("failed to load {}", args.mesh.display()))?;

    let policy = if args.clamp {
        BoundsPolicy::Clamp
    } else {
        BoundsPolicy::Fail
    };
    let profiles = generate_profiles(&volume, mesh.vertices(), policy)?;
    log::info!(
        "sampled {} timepoint(s) at {} vertices",
        profiles.columns(),
        profiles.len()
    );

    let mesh = mesh.with_vertex_data(profiles)?;
    save_geometry(&args.output, &mesh)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    Ok(())
}

/// Reads a headerless buffer of little-endian f32 voxels.
fn read_raw_volume(
    p: &Path,
    dims: &[usize],
    spacing: [f32; 3],
    order: MemoryOrder,
) -> anyhow::Result<Volume> {
    let bytes = std::fs::read(p).with_context(|| format!("failed to read {}", p.display()))?;
    let Some(count) = dims.iter().try_fold(1usize, |n, &d| n.checked_mul(d)) else {
        bail!("dimensions {dims:?} are too large");
    };
    if bytes.len() / 4 != count || bytes.len() % 4 != 0 {
        bail!(
            "{} holds {} bytes but dimensions {:?} need {} f32 values",
            p.display(),
            bytes.len(),
            dims,
            count
        );
    }
    let mut values = vec![0.0; count];
    let mut reader = bytes.as_slice();
    reader.read_f32_into::<LittleEndian>(&mut values)?;
    Ok(Volume::from_buffer(values, dims, spacing, order)?)
}
