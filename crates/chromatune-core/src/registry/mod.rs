//! Playlist registry.
//!
//! Records which playlists have been ingested. Backed by SQLite so that
//! writes go through the database's file lock instead of the wholesale
//! read-modify-write a flat file would need.

mod db;
mod migrations;

pub use db::Registry;
