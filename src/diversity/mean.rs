//! Fixed-window moving average.

/// Average of the last `window` observed values.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    values: Vec<f64>,
    window: usize,
    next: usize,
    sum: f64,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        MovingAverage {
            values: Vec::with_capacity(window),
            window,
            next: 0,
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() < self.window {
            self.values.push(value);
        } else {
            self.sum -= self.values[self.next];
            self.values[self.next] = value;
        }
        self.sum += value;
        self.next = (self.next + 1) % self.window;
    }

    /// Average of the stored values, 0 before the first observation
    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
