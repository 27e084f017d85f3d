use std::path::PathBuf;

pub struct TestMesh {
    /// File name under `res/`.
    pub name: &'static str,
    pub vertices: usize,
    pub faces: usize,
}

impl TestMesh {
    pub fn path(&self) -> PathBuf {
        res_path(self.name)
    }
}

/// Absolute path of a file under the workspace `res/` directory.
pub fn res_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../res")
        .join(name)
}

/// Unit tetrahedron: (0,0,0), (1,0,0), (0,1,0), (0,0,1) with facets (0,1,2) and (0,1,3).
pub const VTK_TETRAHEDRON: TestMesh = TestMesh {
    name: "tetrahedron.vtk",
    vertices: 4,
    faces: 2,
};

/// Same tetrahedron with three vertices packed on each POINTS row.
pub const VTK_TETRAHEDRON_PACKED: TestMesh = TestMesh {
    name: "tetrahedron-packed.vtk",
    vertices: 4,
    faces: 2,
};

/// Tetrahedron with a scalar POINT_DATA block of 2.5, 3, 1.25, 4.
pub const VTK_TETRAHEDRON_DATA: TestMesh = TestMesh {
    name: "tetrahedron-data.vtk",
    vertices: 4,
    faces: 2,
};

pub const VTK_OCTAHEDRON: TestMesh = TestMesh {
    name: "octahedron.vtk",
    vertices: 6,
    faces: 8,
};

pub const VTK_OCTAHEDRON_PACKED: TestMesh = TestMesh {
    name: "octahedron-packed.vtk",
    vertices: 6,
    faces: 8,
};

pub const VTK_BINARY: TestMesh = TestMesh {
    name: "binary.vtk",
    vertices: 4,
    faces: 0,
};

pub const PLY_TETRAHEDRON: TestMesh = TestMesh {
    name: "tetrahedron.ply",
    vertices: 4,
    faces: 2,
};

pub const PLY_BINARY: TestMesh = TestMesh {
    name: "binary.ply",
    vertices: 4,
    faces: 2,
};

pub const OBJ_TETRAHEDRON: TestMesh = TestMesh {
    name: "tetrahedron.obj",
    vertices: 4,
    faces: 2,
};

pub const FS_TETRAHEDRON: TestMesh = TestMesh {
    name: "lh.tetrahedron.white",
    vertices: 4,
    faces: 2,
};

pub const FS_OCTAHEDRON: TestMesh = TestMesh {
    name: "lh.octahedron.pial",
    vertices: 6,
    faces: 8,
};

pub const GIFTI_TETRAHEDRON: TestMesh = TestMesh {
    name: "tetrahedron.surf.gii",
    vertices: 4,
    faces: 2,
};

/// Zlib-compressed coordinates and column-major base64 triangles.
pub const GIFTI_TETRAHEDRON_COMPRESSED: TestMesh = TestMesh {
    name: "tetrahedron-compressed.surf.gii",
    vertices: 4,
    faces: 2,
};

/// Per-vertex thickness 2.5, 3, 1.25, 4 for the tetrahedron.
pub const FS_TETRAHEDRON_THICKNESS: &str = "lh.tetrahedron.thickness";

/// Array 0: scalar 2.5, 3, 1.25, 4. Array 1: big-endian 4x2 time series 1..=8.
pub const GIFTI_TETRAHEDRON_FUNC: &str = "tetrahedron.func.gii";

/// Label covering tetrahedron vertices 1 and 3.
pub const FS_TETRAHEDRON_LABEL: &str = "lh.tetrahedron.label";

/// Parcellation of the tetrahedron: vertex 0 "unknown" (id 0), vertices 1 and 2 "cortex"
/// (id 1), vertex 3 unlabelled.
pub const FS_TETRAHEDRON_ANNOT: &str = "lh.tetrahedron.annot";
