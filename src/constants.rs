// General
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;
pub const DEFAULT_EXHAUST_AFTER: u32 = 5;
/// Longest rest a rate-limited key is given, whatever the provider or config asks for
pub const MAX_COOLDOWN_SECS: u64 = 24 * 60 * 60;
/// Longest pacing interval a rate gate accepts
pub const MAX_MIN_INTERVAL_SECS: u64 = 60 * 60;

// Mistral
pub const MISTRAL_API_ENDPOINT: &str = "https://api.mistral.ai/v1/chat/completions";
pub const MISTRAL_DEFAULT_MODEL: &str = "mistral-small-latest";

// OpenRouter
pub const OPENROUTER_API_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const OPENROUTER_DEFAULT_MODEL: &str = "openrouter/auto";

// Hugging Face
pub const HUGGINGFACE_API_ENDPOINT: &str = "https://router.huggingface.co/v1/chat/completions";
pub const HUGGINGFACE_DEFAULT_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";
pub const HUGGINGFACE_DEFAULT_MAX_TOKENS: u32 = 2048;

// Gemini
pub const GEMINI_API_ENDPOINT_PREFIX: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const GEMINI_DEFAULT_TOP_K: u32 = 64;
pub const GEMINI_DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

// Environment
pub const ENV_RATE_LIMIT: &str = "LLM_RATE_LIMIT";
pub const ENV_MISTRAL_KEY: &str = "MISTRAL_KEY";
pub const ENV_OPENROUTER_KEY: &str = "OPENROUTER_KEY";
pub const ENV_HUGGINGFACE_KEY: &str = "HF_KEY";
pub const ENV_GEMINI_KEY: &str = "GEMINI_API_KEY";
