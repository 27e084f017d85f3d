use anyhow::Context;
use laminar_io::{read_geometry, Geometry, MeshFormat};

use crate::args;

pub fn info_command(args: args::InfoArgs) -> anyhow::Result<()> {
    let format = MeshFormat::from_path(&args.mesh)?;
    let mesh = read_geometry(format, &args.mesh)
        .with_context(|| format!("failed to load {}", args.mesh.display()))?;
    print!("{}", summary(format, &mesh));
    Ok(())
}

fn summary(format: MeshFormat, mesh: &Geometry) -> String {
    let mut s = format!(
        "format:   {format}\nvertices: {}\nfacets:   {}\n",
        mesh.vertex_count(),
        mesh.facet_count()
    );
    if let Some((min, max)) = bounds(mesh) {
        s += &format!("bounds:   {min:?} .. {max:?}\n");
    }
    if let Some(data) = mesh.vertex_data() {
        s += &format!("data:     {} column(s)\n", data.columns());
    }
    s
}

fn bounds(mesh: &Geometry) -> Option<([f32; 3], [f32; 3])> {
    let (first, rest) = mesh.vertices().split_first()?;
    let mut min: [f32; 3] = (*first).into();
    let mut max = min;
    for v in rest {
        let v: [f32; 3] = (*v).into();
        for axis in 0..3 {
            min[axis] = min[axis].min(v[axis]);
            max[axis] = max[axis].max(v[axis]);
        }
    }
    Some((min, max))
}
