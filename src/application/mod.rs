// Application layer: the optimization pipeline

pub mod builder;
pub mod constraints;
pub mod diagnosis;
pub mod interpreter;
pub mod seeder;
pub mod service;
pub mod trim;

pub use builder::{BuiltProblem, InvalidData, ProblemBuilder};
pub use interpreter::SolutionInterpreter;
pub use seeder::{FeasibilitySeeder, Seed, SeedRejection};
pub use service::{ChargeOptimizer, OptimizerConfig};
