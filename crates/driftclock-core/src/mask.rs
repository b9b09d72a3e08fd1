//! The obstacle query consumed by the simulation.

/// Answers whether a grid cell is occupied by foreign solid geometry.
///
/// Implementations must accept any coordinate and answer `false` outside
/// their own bounds; the simulation decides how its own walls behave.
pub trait ObstacleMask {
    fn is_solid(&self, x: i32, y: i32) -> bool;
}

impl<F> ObstacleMask for F
where
    F: Fn(i32, i32) -> bool,
{
    fn is_solid(&self, x: i32, y: i32) -> bool {
        self(x, y)
    }
}
