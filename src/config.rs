// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,

    /// Credentials and model for the text-generation service.
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,

    /// How many questions one generated exercise should contain.
    pub questions_per_exercise: u32,

    /// Fraction of questions that must be correct to pass an exercise.
    pub pass_ratio: f64,

    /// Where uploaded files land, and the public URL they are served from.
    pub upload_dir: String,
    pub public_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let openai_api_key = env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");

        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let questions_per_exercise = env::var("QUESTIONS_PER_EXERCISE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(12);

        let pass_ratio = env::var("PASS_RATIO")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.8);

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self {
            database_url,
            rust_log,
            openai_api_key,
            openai_model,
            openai_base_url,
            questions_per_exercise,
            pass_ratio,
            upload_dir,
            public_base_url,
        }
    }
}
