use crate::engine::loading::model_format::{ModelFormat, ModelLoadError};
use bevy::asset::RenderAssetUsages;
use bevy::math::{Affine3A, Mat3, Vec3A};
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use std::io::{BufReader, Cursor};

/// Triangle geometry for one mesh of a parsed model.
#[derive(Debug, Clone, Default)]
pub struct ParsedMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
}

impl ParsedMesh {
    /// Kept in main-world memory as well so placement ray casts can hit it.
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone());
        mesh.insert_indices(Indices::U32(self.indices.clone()));
        match &self.normals {
            Some(normals) => mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals.clone()),
            None => mesh.compute_normals(),
        }
        mesh
    }
}

/// Every mesh in a model file, in model space.
#[derive(Debug, Clone, Default)]
pub struct ParsedModel {
    pub meshes: Vec<ParsedMesh>,
}

impl ParsedModel {
    /// Axis-aligned bounds over all vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.meshes
            .iter()
            .flat_map(|mesh| mesh.positions.iter())
            .map(|p| Vec3::from_array(*p))
            .fold(None, |bounds, p| match bounds {
                None => Some((p, p)),
                Some((min, max)) => Some((min.min(p), max.max(p))),
            })
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.indices.len() / 3).sum()
    }
}

/// Parse raw file bytes. Runs off the main thread.
pub fn parse_model(format: ModelFormat, bytes: &[u8]) -> Result<ParsedModel, ModelLoadError> {
    let model = match format {
        ModelFormat::Obj => parse_obj(bytes)?,
        ModelFormat::Fbx => parse_fbx(bytes)?,
    };

    if model.triangle_count() == 0 {
        return Err(ModelLoadError::EmptyGeometry);
    }
    Ok(model)
}

fn parse_obj(bytes: &[u8]) -> Result<ParsedModel, ModelLoadError> {
    let mut reader = BufReader::new(Cursor::new(bytes));
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    // Material libraries live beside the file on disk, which an upload does
    // not have.
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &options, |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .map_err(|err| ModelLoadError::Obj(err.to_string()))?;

    let meshes = models
        .into_iter()
        .filter(|model| !model.mesh.indices.is_empty())
        .map(|model| {
            let mesh = model.mesh;
            let normals = (mesh.normals.len() == mesh.positions.len())
                .then(|| mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect());
            ParsedMesh {
                name: model.name,
                positions: mesh
                    .positions
                    .chunks_exact(3)
                    .map(|p| [p[0], p[1], p[2]])
                    .collect(),
                normals,
                indices: mesh.indices,
            }
        })
        .collect();

    Ok(ParsedModel { meshes })
}

/// Geometry is baked into world space per node, so instanced meshes appear
/// once per node that references them.
fn parse_fbx(bytes: &[u8]) -> Result<ParsedModel, ModelLoadError> {
    let scene = ufbx::load_memory(bytes, ufbx::LoadOpts::default())
        .map_err(|err| ModelLoadError::Fbx(format!("{:?}", err)))?;

    let mut meshes = Vec::new();
    for (node_index, node) in scene.nodes.iter().enumerate() {
        let Some(mesh) = node.mesh.as_ref() else {
            continue;
        };
        let to_world = affine_from_fbx(&node.geometry_to_world);
        let normal_matrix = to_world.matrix3.inverse().transpose();

        let has_normals = mesh.vertex_normal.exists;
        let mut parsed = ParsedMesh {
            name: format!("fbx-node-{}", node_index),
            normals: has_normals.then(Vec::new),
            ..Default::default()
        };

        // Faces are fanned into triangles and de-indexed corner by corner.
        let mut corners: Vec<u32> = Vec::new();
        for face in mesh.faces.iter() {
            let triangles = ufbx::triangulate_face_vec(&mut corners, mesh, *face);
            for &corner in corners.iter().take(triangles as usize * 3) {
                let corner = corner as usize;
                let position = mesh.vertex_position.values[mesh.vertex_position.indices[corner] as usize];
                let position = to_world.transform_point3a(Vec3A::new(
                    position.x as f32,
                    position.y as f32,
                    position.z as f32,
                ));
                parsed.indices.push(parsed.positions.len() as u32);
                parsed.positions.push(position.to_array());

                if let Some(normals) = parsed.normals.as_mut() {
                    let normal = mesh.vertex_normal.values[mesh.vertex_normal.indices[corner] as usize];
                    let normal = (normal_matrix
                        * Vec3A::new(normal.x as f32, normal.y as f32, normal.z as f32))
                    .normalize_or_zero();
                    normals.push(normal.to_array());
                }
            }
        }

        if !parsed.indices.is_empty() {
            meshes.push(parsed);
        }
    }

    Ok(ParsedModel { meshes })
}

/// ufbx matrices are column-major 3x4 in double precision.
fn affine_from_fbx(matrix: &ufbx::Matrix) -> Affine3A {
    Affine3A::from_mat3_translation(
        Mat3::from_cols(
            Vec3::new(matrix.m00 as f32, matrix.m10 as f32, matrix.m20 as f32),
            Vec3::new(matrix.m01 as f32, matrix.m11 as f32, matrix.m21 as f32),
            Vec3::new(matrix.m02 as f32, matrix.m12 as f32, matrix.m22 as f32),
        ),
        Vec3::new(matrix.m03 as f32, matrix.m13 as f32, matrix.m23 as f32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYRAMID_OBJ: &str = "\
o pyramid
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
v 0.0 2.0 0.0
f 1 2 3 4
f 1 2 5
f 2 3 5
f 3 4 5
f 4 1 5
";

    #[test]
    fn obj_quads_are_triangulated() {
        let model = parse_model(ModelFormat::Obj, PYRAMID_OBJ.as_bytes()).expect("valid obj");
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 6);
    }

    #[test]
    fn obj_bounds_cover_all_vertices() {
        let model = parse_model(ModelFormat::Obj, PYRAMID_OBJ.as_bytes()).expect("valid obj");
        let (min, max) = model.bounds().expect("bounds");
        assert_eq!(min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn obj_without_faces_is_empty_geometry() {
        let result = parse_model(ModelFormat::Obj, b"v 0 0 0\nv 1 0 0\n");
        assert!(matches!(result, Err(ModelLoadError::EmptyGeometry)));
    }

    #[test]
    fn garbage_fbx_is_rejected() {
        let result = parse_model(ModelFormat::Fbx, b"definitely not an fbx file");
        assert!(matches!(result, Err(ModelLoadError::Fbx(_))));
    }

    /// One triangle geometry shared by two nodes, 200 units apart.
    const INSTANCED_FBX: &str = r#"; FBX 7.4.0 project file
FBXHeaderExtension:  {
	FBXHeaderVersion: 1003
	FBXVersion: 7400
}
Objects:  {
	Geometry: 1000, "Geometry::triangle", "Mesh" {
		Vertices: *9 {
			a: 0,0,0,1,0,0,0,1,0
		}
		PolygonVertexIndex: *3 {
			a: 0,1,-3
		}
	}
	Model: 2000, "Model::left", "Mesh" {
		Properties70:  {
			P: "Lcl Translation", "Lcl Translation", "", "A",-100,0,0
		}
	}
	Model: 2001, "Model::right", "Mesh" {
		Properties70:  {
			P: "Lcl Translation", "Lcl Translation", "", "A",100,0,0
		}
	}
}
Connections:  {
	C: "OO",1000,2000
	C: "OO",1000,2001
	C: "OO",2000,0
	C: "OO",2001,0
}
"#;

    #[test]
    fn fbx_instances_are_placed_by_their_nodes() {
        let model = parse_model(ModelFormat::Fbx, INSTANCED_FBX.as_bytes()).expect("valid fbx");
        assert_eq!(model.meshes.len(), 2);
        assert_eq!(model.triangle_count(), 2);

        let (min, max) = model.bounds().expect("bounds");
        assert!((min.x + 100.0).abs() < 1e-3, "min {:?}", min);
        assert!((max.x - 101.0).abs() < 1e-3, "max {:?}", max);
        assert!((max.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn parsed_mesh_gets_normals_when_missing() {
        let model = parse_model(ModelFormat::Obj, PYRAMID_OBJ.as_bytes()).expect("valid obj");
        let mesh = model.meshes[0].to_mesh();
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    }
}
