//! Shared traits and interfaces

use rand::Rng;

/// Source of the uniform draw used to decide whether a bet wins.
///
/// Implementations must return a value in [0.0, 1.0). No fairness or
/// auditability is promised.
pub trait WinDraw: Send + Sync {
    fn draw(&self) -> f64;
}

/// Thread-local, non-cryptographic generator
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDraw;

impl WinDraw for ThreadRngDraw {
    fn draw(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Always returns the same value. Used by tests to force an outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub f64);

impl WinDraw for FixedDraw {
    fn draw(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_rng_draw_stays_in_unit_interval() {
        let draw = ThreadRngDraw;
        for _ in 0..1_000 {
            let r = draw.draw();
            assert!((0.0..1.0).contains(&r), "draw {} out of range", r);
        }
    }
}
