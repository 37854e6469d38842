//! Public library API for capturing object graphs and reconstructing them as test code.

/// Heap capture, value graphs, setup and matcher code generation, and test accumulation.
pub mod recall;
