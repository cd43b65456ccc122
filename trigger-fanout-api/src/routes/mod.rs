/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `telemetry_query`: Read-only telemetry collection/resource endpoints
/// - `trigger`: The trigger update fan-out RPC handler

pub mod health;
pub mod telemetry_query;
pub mod trigger;
