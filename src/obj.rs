use std::{io::BufRead, path::Path};

use glam::DVec3;

use crate::{element::VH, error::Error, mesh::Mesh};

impl Mesh {
    /// Load a polygon mesh from an obj file. All the models in the file are
    /// merged into one mesh.
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj(path, &tobj::LoadOptions::default())
            .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        Self::from_models(models)
    }

    /// Load a polygon mesh from obj data in a buffer. Material libraries are
    /// ignored.
    pub fn load_obj_buf(reader: &mut impl BufRead) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj_buf(reader, &tobj::LoadOptions::default(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        Self::from_models(models)
    }

    fn from_models(models: Vec<tobj::Model>) -> Result<Self, Error> {
        let (nverts, nfaces) = models
            .iter()
            .fold((0usize, 0usize), |(nverts, nfaces), model| {
                let msh = &model.mesh;
                (
                    nverts + (msh.positions.len() / 3),
                    nfaces + msh.face_arities.len().max(msh.indices.len() / 3),
                )
            });
        let nedges = nfaces * 2; // Estimate.
        let mut outmesh = Mesh::with_capacity(nverts, nedges, nfaces);
        let mut positions = Vec::new();
        let mut fvs: Vec<VH> = Vec::new();
        for model in models {
            let mesh = model.mesh;
            if mesh.positions.len() % 3 != 0 {
                return Err(Error::IncorrectNumberOfCoordinates(mesh.positions.len()));
            }
            positions.clear();
            positions.extend(
                mesh.positions
                    .chunks(3)
                    .map(|triplet| DVec3::new(triplet[0], triplet[1], triplet[2])),
            );
            let voffset = outmesh.add_vertices(&positions).start;
            // Without arities every face is a triangle.
            let arities: Vec<usize> = if mesh.face_arities.is_empty() {
                vec![3; mesh.indices.len() / 3]
            } else {
                mesh.face_arities.iter().map(|a| *a as usize).collect()
            };
            let mut start = 0usize;
            for size in arities {
                let indices = mesh
                    .indices
                    .get(start..(start + size))
                    .ok_or_else(|| Error::ObjLoadFailed("face index out of range".into()))?;
                start += size;
                if indices.iter().any(|i| (*i as usize) >= positions.len()) {
                    return Err(Error::ObjLoadFailed("face refers to a missing vertex".into()));
                }
                fvs.clear();
                fvs.extend(indices.iter().map(|i| VH::from(i + voffset)));
                outmesh.add_face(&fvs)?;
            }
        }
        Ok(outmesh)
    }
}
