// Service exports
pub mod cascade;
pub mod directory;
pub mod oracle;

pub use cascade::{Discovery, DiscoveryEngine};
pub use directory::{
    DirectoryCollections, DirectoryError, DirectoryProvider, HttpDirectory, StaticDirectory,
};
pub use oracle::{
    extract_json, AiDiscovery, GeminiClient, MatchAnalysis, Oracle, OracleError,
    SynthesizedCounterpart,
};
