/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{fmt, str::FromStr};
use serde::{Serialize,Deserialize};
use crate::{Stats, errors::{Result,HiseqImageError}};
use num::{Zero,Bounded};
use std::ops::{Add, Div, Mul, Sub};

/// number of tile rows and columns
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub struct TileGridSize {
    pub rows: u32,
    pub cols: u32,
}

impl TileGridSize {
    pub const fn new (rows: u32, cols: u32)->Self { TileGridSize{rows,cols} }
    pub const fn square (n: u32)->Self { TileGridSize{rows: n, cols: n} }

    pub fn validate (&self)->Result<()> {
        if self.rows == 0 || self.cols == 0 {
            Err( HiseqImageError::InvalidConfiguration(format!("tile grid must have positive rows and columns, got {self}")))
        } else {
            Ok(())
        }
    }
}

impl Default for TileGridSize {
    fn default()->Self { TileGridSize::square(8) }
}

impl fmt::Display for TileGridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// parses "<rows>x<cols>" (also accepting 'X' and '*') or a single "<n>" for a square grid
impl FromStr for TileGridSize {
    type Err = HiseqImageError;

    fn from_str (s: &str) -> Result<Self> {
        let parse_dim = |d: &str| d.trim().parse::<u32>()
            .map_err(|_| HiseqImageError::InvalidConfiguration(format!("invalid tile grid size '{s}'")));

        let s = s.trim();
        let grid = match s.split_once(|c| c=='x' || c=='X' || c=='*') {
            Some((r,c)) => TileGridSize::new( parse_dim(r)?, parse_dim(c)?),
            None => TileGridSize::square( parse_dim(s)?)
        };
        grid.validate()?;
        Ok(grid)
    }
}

/// a rectangular region of the intensity channel
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Tile {
    pub row: usize,
    pub col: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    /// center of the tile in pixel index space
    pub fn center (&self)->(f64,f64) {
        ( self.x as f64 + (self.width - 1) as f64 / 2.0,
          self.y as f64 + (self.height - 1) as f64 / 2.0 )
    }

    pub fn contains (&self, x: u32, y: u32)->bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// even partition of a `width x height` channel into `rows x cols` tiles. Every tile has
/// `extent / n` pixels along each axis, the last row and column of tiles absorb the remainder.
/// A grid that has more rows (cols) than the image has pixel rows (cols) is reduced to the
/// image dimension so that no tile is empty
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    pub size: TileGridSize,

    col_offsets: Vec<u32>, // n_cols+1 boundaries
    row_offsets: Vec<u32>, // n_rows+1 boundaries
}

impl TileGrid {
    pub fn new (width: u32, height: u32, grid: TileGridSize)->Result<Self> {
        grid.validate()?;
        if width == 0 || height == 0 {
            return Err( HiseqImageError::EmptyImage(format!("cannot partition {width}x{height} into tiles")))
        }

        let size = TileGridSize::new( grid.rows.min(height), grid.cols.min(width));
        let col_offsets = axis_offsets( width, size.cols);
        let row_offsets = axis_offsets( height, size.rows);

        Ok( TileGrid{ width, height, size, col_offsets, row_offsets } )
    }

    pub fn rows (&self)->usize { self.size.rows as usize }
    pub fn cols (&self)->usize { self.size.cols as usize }

    pub fn tile (&self, row: usize, col: usize)->Tile {
        let x = self.col_offsets[col];
        let y = self.row_offsets[row];
        let width = self.col_offsets[col+1] - x;
        let height = self.row_offsets[row+1] - y;
        Tile { row, col, x, y, width, height }
    }

    /// all tiles in row major order
    pub fn tiles (&self)->impl Iterator<Item=Tile> + '_ {
        (0..self.rows()).flat_map( move |row| (0..self.cols()).map( move |col| self.tile(row,col)))
    }

    pub fn col_offsets (&self)->&[u32] { &self.col_offsets }
    pub fn row_offsets (&self)->&[u32] { &self.row_offsets }

    /// (col,row) of the tile that contains pixel (x,y)
    pub fn tile_index_of (&self, x: u32, y: u32)->(usize,usize) {
        (axis_index( &self.col_offsets, x), axis_index( &self.row_offsets, y))
    }
}

fn axis_offsets (extent: u32, n: u32)->Vec<u32> {
    let base = extent / n;
    let mut offsets: Vec<u32> = (0..n).map(|i| i * base).collect();
    offsets.push( extent);
    offsets
}

fn axis_index (offsets: &[u32], v: u32)->usize {
    let n = offsets.len() - 1;
    match offsets.binary_search( &v) {
        Ok(i) => i.min(n-1),
        Err(i) => i - 1
    }
}

/* #region tile data *********************************************************************/

/// a 2D matrix that is used as a container for computed per-tile data, indexed by (col,row)
#[derive(Debug,Clone)]
pub struct TileData<T> {
    width: usize,
    height: usize,
    data: Vec<T>
}

impl<T> TileData<T> {

    pub fn from_fn<F> (width: usize, height: usize, mut f: F)->Self where F: FnMut(usize,usize)->T {
        let mut data = Vec::with_capacity( width*height);
        for y in 0..height {
            for x in 0..width {
                data.push( f(x,y));
            }
        }
        TileData{width,height,data}
    }

    pub fn new_with (width: usize, height: usize, v: T)->Self where T: Clone {
        TileData{ width, height, data: vec![v; width*height] }
    }

    pub fn dimensions(&self)->(usize,usize) {
        (self.width, self.height)
    }

    pub fn width(&self)->usize { self.width }
    pub fn height(&self)->usize { self.height }
    pub fn len(&self)->usize { self.data.len() }
    pub fn is_empty(&self)->bool { self.data.is_empty() }

    #[inline(always)]
    pub fn get(&self, x:usize, y: usize)->&T { &self.data[ y*self.width + x] }

    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, v: T) { self.data[ y*self.width + x] = v; }

    pub fn iter (&self)->impl Iterator<Item=&T> { self.data.iter() }
}

impl<T> TileData<T>
    where T: Add<T,Output=T> + Sub<T,Output=T> + Div<T,Output=T> + Mul<T,Output=T> +
             Bounded + PartialOrd + PartialEq + Zero + Into<f64> + Copy
{
    pub fn new (width: usize, height: usize)->Self {
        Self::new_with( width, height, T::zero())
    }

    pub fn stats(&self)->Stats<T> {
        Stats::from_values( self.data.iter().copied())
    }

    pub fn print (&self, size: usize, decimals: usize) {
        let (w,h) = self.dimensions();

        print!( "     ");
        for x in 0..w { print!( "{:size$}", x); }
        println!();
        print!("    ┌");
        for _ in 0..w*size { print!( "─"); }
        println!("┐");

        for y in 0..h {
            print!( "{:3} │", y);
            for x in 0..w {
                let v: f64 = (*self.get(x, y)).into();
                print!( "{:size$.decimals$}", v);
            }
            println!("│ {:3}", y);
        }

        print!("    └");
        for _ in 0..w*size { print!( "─"); }
        println!("┘");
    }
}

/* #endregion tile data */
