//! Integration tests for `SqliteStore` against an in-memory database.


use likeness_core::{
  face::{BoundingBox, DetectedFace},
  fingerprint::Fingerprint,
  photo::{Location, NewPhoto, Photo},
  store::LibraryStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_photo(name: &str) -> NewPhoto {
  NewPhoto {
    fingerprint: Fingerprint::of_bytes(name.as_bytes()),
    path:        format!("/photos/{name}"),
    filename:    name.into(),
    captured_at: None,
    location:    Location::default(),
    width:       Some(4000),
    height:      Some(3000),
  }
}

async fn photo(s: &SqliteStore, name: &str) -> Photo {
  s.insert_photo(new_photo(name)).await.unwrap()
}

fn detected(embedding: [f32; 4]) -> DetectedFace {
  DetectedFace { bbox: BoundingBox::new(10, 10, 110, 110), embedding: embedding.to_vec() }
}
