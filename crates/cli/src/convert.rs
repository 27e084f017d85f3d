use anyhow::Context;
use laminar_io::{load_geometry, load_vertex_data_array, save_geometry};

use crate::args;

pub fn convert_command(args: args::ConvertArgs) -> anyhow::Result<()> {
    let mut mesh = load_geometry(args.input.as_path())
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    if let Some(p) = &args.data {
        let data = load_vertex_data_array(p, args.data_index)
            .with_context(|| format!("failed to load vertex data from {}", p.display()))?;
        mesh = mesh.with_vertex_data(data)?;
    }
    save_geometry(&args.output, &mesh)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!(
        "wrote {} vertices and {} facets to {}",
        mesh.vertex_count(),
        mesh.facet_count(),
        args.output.display()
    );
    Ok(())
}
