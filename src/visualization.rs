//! Visualization utilities for CVRP solutions.
//!
//! Generates SVG plots of route plans.

use crate::instance::Instance;
use crate::solution::Solution;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const PALETTE: [&str; 10] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4",
    "#46f0f0", "#f032e6", "#9a6324", "#808000", "#000075",
];

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
    /// Print customer ids next to the nodes
    pub show_labels: bool,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 4.0,
            show_labels: true,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG plot of the routes of a solution. Every route is drawn
    /// as a closed polyline through the depot in its own colour.
    pub fn generate_svg(&self, instance: &Instance, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = self.get_bounds(instance);

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .customer {{ fill: #ffffff; stroke: #2c3e50; stroke-width: 1.5; }}
    .depot {{ fill: #2c3e50; stroke: #000000; stroke-width: 2; }}
    .route {{ stroke-width: 2; fill: none; stroke-linejoin: round; }}
    .label {{ font-family: Arial; font-size: 9px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ffffff"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | Cost: {:.2} | Routes: {} | Feasible: {}</text>
"##,
            self.margin,
            instance.name,
            solution.f,
            solution.num_routes(),
            solution.is_feasible()
        ));

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        let depot = &instance.locations[0];
        let (dx, dy) = transform(depot.x, depot.y);

        for (k, route) in solution.to_routes().iter().enumerate() {
            let mut points = format!("{:.2},{:.2}", dx, dy);
            for &c in route {
                let (x, y) = transform(instance.locations[c].x, instance.locations[c].y);
                points.push_str(&format!(" {:.2},{:.2}", x, y));
            }
            points.push_str(&format!(" {:.2},{:.2}", dx, dy));

            svg.push_str(&format!(
                r##"<polyline points="{}" class="route" stroke="{}"/>
"##,
                points,
                PALETTE[k % PALETTE.len()]
            ));
        }

        for location in instance.locations.iter().skip(1) {
            let (x, y) = transform(location.x, location.y);
            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="customer"/>
"##,
                x, y, self.node_radius
            ));
            if self.show_labels {
                svg.push_str(&format!(
                    r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                    x,
                    y - self.node_radius - 2.0,
                    location.id
                ));
            }
        }

        let side = 3.0 * self.node_radius;
        svg.push_str(&format!(
            r##"<rect x="{:.2}" y="{:.2}" width="{}" height="{}" class="depot"/>
"##,
            dx - side / 2.0,
            dy - side / 2.0,
            side,
            side
        ));

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Get coordinate bounds
    fn get_bounds(&self, instance: &Instance) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for location in &instance.locations {
            min_x = min_x.min(location.x);
            max_x = max_x.max(location.x);
            min_y = min_y.min(location.y);
            max_y = max_y.max(location.y);
        }

        (min_x, max_x, min_y, max_y)
    }
}
