pub mod openai;
mod sse;
