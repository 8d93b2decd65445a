// src/models/mod.rs

pub mod course;
pub mod exercise;
pub mod lesson;
pub mod page;
pub mod score;
pub mod student;
pub mod syllabus;
pub mod upload;
