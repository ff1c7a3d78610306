/// Running mean over the last `window` readings.
///
/// The window starts full of `initial`, so a fresh smoother reports `initial`
/// until enough real readings arrive. Seeding with the sensor's maximum range
/// keeps the effects off at startup.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    readings: Vec<f32>,
    index: usize,
}

impl MovingAverage {
    pub fn new(window: usize, initial: f32) -> Self {
        let window = window.max(1);
        Self {
            readings: vec![initial; window],
            index: 0,
        }
    }

    pub fn window(&self) -> usize {
        self.readings.len()
    }

    /// Replace the oldest reading with `value` and return the new mean.
    pub fn push(&mut self, value: f32) -> f32 {
        self.readings[self.index] = value;
        self.index = (self.index + 1) % self.readings.len();
        self.mean()
    }

    pub fn mean(&self) -> f32 {
        // Summed fresh so a window of zeros averages to exactly 0
        let total: f64 = self.readings.iter().map(|&r| r as f64).sum();
        (total / self.readings.len() as f64) as f32
    }
}
