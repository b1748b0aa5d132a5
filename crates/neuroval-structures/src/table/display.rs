// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Plain-text rendering of tables for narratives and logs.

use super::Table;
use std::fmt::{Display, Formatter};

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut header: Vec<String> = self
            .index()
            .names()
            .iter()
            .map(|name| name.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect();
        header.extend(self.columns().iter().map(|c| c.label.to_string()));

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(self.nrows());
        for row in 0..self.nrows() {
            let mut cells: Vec<String> = self
                .index()
                .key(row)
                .map(|key| key.iter().map(ToString::to_string).collect())
                .unwrap_or_default();
            cells.extend(self.columns().iter().map(|c| c.values[row].to_string()));
            rows.push(cells);
        }

        let mut widths: Vec<usize> = header.iter().map(String::len).collect();
        for cells in &rows {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.len());
            }
        }

        let render = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(f, "{}", render(&header))?;
        for cells in &rows {
            writeln!(f, "{}", render(cells))?;
        }
        Ok(())
    }
}
