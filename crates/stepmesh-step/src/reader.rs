//! STEP file reader: turns parsed Part 21 data into a [`StepShape`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{debug, info};

use crate::entities::{parse_face, parse_shell, parse_solid_shells, parse_surface_model_shells};
use crate::error::StepError;
use crate::parser::{Parser, StepFile};
use crate::shape::{Body, BodyKind, StepShape};

/// Read a STEP file from a path.
pub fn read_step(path: impl AsRef<Path>) -> Result<StepShape, StepError> {
    let data = std::fs::read(path)?;
    read_step_from_buffer(&data)
}

/// Read a STEP file from a byte buffer.
///
/// Fails with [`StepError::NoShapes`] when the file holds no solid, surface
/// model, or shell.
pub fn read_step_from_buffer(data: &[u8]) -> Result<StepShape, StepError> {
    let file = Parser::parse(data)?;
    debug!(entities = file.entities.len(), "parsed STEP data section");
    let shape = StepReader::new(&file).read()?;
    info!(
        bodies = shape.bodies.len(),
        faces = shape.faces.len(),
        "read STEP shape"
    );
    Ok(shape)
}

struct StepReader<'a> {
    file: &'a StepFile,
    /// Face ID → reversed, first use wins.
    faces: BTreeMap<u64, bool>,
}

impl<'a> StepReader<'a> {
    fn new(file: &'a StepFile) -> Self {
        Self {
            file,
            faces: BTreeMap::new(),
        }
    }

    fn read(mut self) -> Result<StepShape, StepError> {
        let mut bodies = self.collect_bodies()?;
        if bodies.is_empty() {
            return Err(StepError::NoShapes);
        }
        bodies.sort_by_key(|b| b.id);

        for body in &mut bodies {
            for &shell_id in &body.shells {
                let shell = parse_shell(self.file, shell_id)?;
                body.face_count += shell.faces.len();
                for face in shell.faces {
                    self.faces.entry(face.id).or_insert(face.reversed);
                }
            }
            debug!(id = body.id, kind = ?body.kind, faces = body.face_count, "body");
        }

        let mut faces = Vec::with_capacity(self.faces.len());
        for (&id, &reversed) in &self.faces {
            let mut face = parse_face(self.file, id)?;
            if reversed {
                face.same_sense = !face.same_sense;
            }
            faces.push(face);
        }

        Ok(StepShape {
            faces,
            bodies,
            schemas: self.file.schemas(),
        })
    }

    fn collect_bodies(&self) -> Result<Vec<Body>, StepError> {
        let mut bodies = Vec::new();
        for type_name in ["MANIFOLD_SOLID_BREP", "BREP_WITH_VOIDS"] {
            for entity in self.file.entities_of_type(type_name) {
                bodies.push(body(entity.id, BodyKind::Solid, parse_solid_shells(self.file, entity.id)?));
            }
        }
        for entity in self.file.entities_of_type("SHELL_BASED_SURFACE_MODEL") {
            bodies.push(body(
                entity.id,
                BodyKind::SurfaceModel,
                parse_surface_model_shells(self.file, entity.id)?,
            ));
        }
        if !bodies.is_empty() {
            return Ok(bodies);
        }

        // No root entities: fall back to every shell that is not nested in
        // an oriented shell.
        let nested: BTreeSet<u64> = self
            .file
            .entities_of_type("ORIENTED_CLOSED_SHELL")
            .filter_map(|e| e.args.get(2).and_then(|v| v.as_entity_ref()))
            .collect();
        for type_name in ["CLOSED_SHELL", "OPEN_SHELL", "ORIENTED_CLOSED_SHELL"] {
            for entity in self.file.entities_of_type(type_name) {
                if !nested.contains(&entity.id) {
                    bodies.push(body(entity.id, BodyKind::Shell, vec![entity.id]));
                }
            }
        }
        Ok(bodies)
    }
}

fn body(id: u64, kind: BodyKind, shells: Vec<u64>) -> Body {
    Body {
        id,
        kind,
        shells,
        face_count: 0,
    }
}
