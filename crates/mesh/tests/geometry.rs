use float_eq::assert_float_eq;
use laminar_mesh::{Facet, Geometry, GeometryError, MemoryOrder, Vector3, VertexData};

// Square pyramid: four base corners and an apex.
const COORDS: [[f32; 3]; 5] = [
    [0.0, 0.0, 0.0],
    [2.0, 0.0, 0.0],
    [2.0, 2.0, 0.0],
    [0.0, 2.0, 0.0],
    [1.0, 1.0, 1.5],
];
const FACES: [[u32; 3]; 6] = [
    [0, 2, 1],
    [0, 3, 2],
    [0, 1, 4],
    [1, 2, 4],
    [2, 3, 4],
    [3, 0, 4],
];

fn pyramid() -> Geometry {
    Geometry::new(
        COORDS.iter().map(|&c| c.into()).collect(),
        FACES.iter().map(|&f| f.into()).collect(),
    )
    .unwrap()
}

#[test]
fn column_major_buffers_rebuild_the_same_mesh() {
    let mesh = pyramid();
    let coords = mesh.vertex_buffer(MemoryOrder::ColumnMajor);
    let faces = mesh.facet_buffer(MemoryOrder::ColumnMajor);

    // All x coordinates come first.
    assert_eq!(&[0.0, 2.0, 2.0, 0.0, 1.0], &coords[..5]);
    assert_eq!(&[0, 0, 0, 1, 2, 3], &faces[..6]);

    let rebuilt = Geometry::from_buffers(&coords, &faces, MemoryOrder::ColumnMajor).unwrap();
    assert_eq!(mesh, rebuilt);
}

#[test]
fn row_major_buffer_matches_vertex_slice() {
    let mesh = pyramid();
    assert_eq!(
        mesh.vertex_slice(),
        mesh.vertex_buffer(MemoryOrder::RowMajor).as_slice()
    );
    assert_eq!(15, mesh.vertex_slice().len());
}

#[test]
fn base_normals_point_down() {
    let mesh = pyramid();
    for t in mesh.triangles().take(2) {
        let n = t.area_normal();
        assert_float_eq!([0.0, 0.0, -4.0], [n.x, n.y, n.z], abs_all <= 1e-6);
    }
    // Twice the area of a sloped side: base 2, slant height sqrt(1 + 1.5^2).
    let side = mesh.triangles().nth(2).unwrap().area_normal();
    assert_float_eq!(13f32.sqrt(), (side.x * side.x + side.y * side.y + side.z * side.z).sqrt(), rmax <= 1e-6);
}

#[test]
fn ragged_buffers_are_rejected() {
    assert_eq!(
        Err(GeometryError::BufferShape { len: 4, width: 3 }),
        Geometry::from_buffers(&[0.0; 4], &[], MemoryOrder::RowMajor)
    );
}

#[test]
fn bad_facet_in_buffer() {
    let coords = [0.0f32; 9];
    assert!(matches!(
        Geometry::from_buffers(&coords, &[0, 1, 3], MemoryOrder::RowMajor),
        Err(GeometryError::FacetOutOfRange { index: 3, .. })
    ));
}

#[test]
fn vertex_data_travels_with_the_mesh() {
    let data = VertexData::from_rows(2, (0..10).map(|i| i as f32).collect()).unwrap();
    let mesh = pyramid().with_vertex_data(data.clone()).unwrap();
    assert_eq!(&[8.0, 9.0], mesh.vertex_data().unwrap().row(4));

    let (vertices, facets, vertex_data) = mesh.into_parts();
    assert_eq!(5, vertices.len());
    assert_eq!(Facet::new(3, 0, 4), facets[5]);
    assert_eq!(Some(data), vertex_data);
}

#[test]
fn empty_mesh_is_valid() {
    let mesh = Geometry::new(Vec::<Vector3>::new(), Vec::new()).unwrap();
    assert_eq!(0, mesh.vertex_count());
    assert!(mesh.vertex_buffer(MemoryOrder::ColumnMajor).is_empty());
}
