use bevy::prelude::*;
use constants::scene::ANNOTATION_DEFAULT_TITLE;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-placed note pinned to a point in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub position: [f32; 3],
    pub title: String,
    pub description: String,
}

impl Annotation {
    /// Fresh annotation with a unique id and placeholder text.
    pub fn at(position: Vec3) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            position: position.to_array(),
            title: ANNOTATION_DEFAULT_TITLE.to_string(),
            description: String::new(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Ordered annotation collection. Ids are unique; insertion order is kept.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    /// Append an annotation. Returns false if its id is already present.
    pub fn add(&mut self, annotation: Annotation) -> bool {
        if self.get(&annotation.id).is_some() {
            warn!("Ignoring annotation with duplicate id {}", annotation.id);
            return false;
        }
        self.annotations.push(annotation);
        true
    }

    /// Replace title and description by id. Unknown ids are ignored.
    pub fn edit(&mut self, id: &str, title: &str, description: &str) -> bool {
        match self.annotations.iter_mut().find(|a| a.id == id) {
            Some(annotation) => {
                annotation.title = title.to_string();
                annotation.description = description.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        self.annotations.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn last(&self) -> Option<&Annotation> {
        self.annotations.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.annotations.iter().map(|a| a.id.as_str())
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
