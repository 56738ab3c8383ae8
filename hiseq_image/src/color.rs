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

//! color space adapter: split an 8-bit image into an intensity channel that can be equalized
//! and side channels that carry the chromatic information, and put it back together.
//!
//! Quantization: the intensity channel is an 8-bit `GrayImage`, i.e. the intensity computed by the
//! forward transform is rounded (half away from zero). The side channels are kept as f32 planes and
//! also store the rounding residual of the intensity, so `recompose(decompose(img))` only loses
//! precision in the final 8-bit quantization of the RGB samples (±1 per channel).
//! If the intensity channel gets modified the residual is still added back, which shifts each
//! sample by less than half an intensity level.

use std::str::FromStr;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use serde::{Serialize,Deserialize};
use strum::{Display,EnumIter,EnumString};
use hiseq_common::{quantize_u8, pow2};

use crate::{GrayImage32f, check_not_empty, errors::{Result,HiseqImageError}};

/// the supported color models. Parsing is case insensitive ("ycrcb", "hsv", "Lab" ..)
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize,Display,EnumString,EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ColorSpace {
    /// BT.601 luma + red/blue difference chroma, intensity is Y
    #[strum(to_string="YCrCb")]
    #[serde(rename="YCrCb", alias="ycrcb")]
    YCrCb,

    /// hue/saturation/value, intensity is V = max(R,G,B)
    #[strum(to_string="HSV")]
    #[serde(rename="HSV", alias="hsv")]
    Hsv,

    /// CIE L*a*b* (sRGB, D65 white point), intensity is L* scaled to [0,255]
    #[strum(to_string="LAB")]
    #[serde(rename="LAB", alias="lab")]
    Lab,
}

impl ColorSpace {
    pub fn from_name (name: &str)->Result<Self> {
        ColorSpace::from_str( name.trim()).map_err(|_| HiseqImageError::InvalidColorSpace(format!("'{name}' (must be YCrCb|HSV|LAB)")))
    }
}

/// the non-intensity planes of a decomposed color image
/// `first`/`second` are (Cr,Cb) for YCrCb, (H,S) for HSV and (a*,b*) for LAB
#[derive(Debug,Clone)]
pub struct SideChannels {
    pub first: GrayImage32f,
    pub second: GrayImage32f,

    /// intensity lost when quantizing to 8 bit (unquantized - quantized)
    pub residual: GrayImage32f,
}

impl SideChannels {
    pub fn dimensions (&self)->(u32,u32) {
        self.first.dimensions()
    }
}

#[derive(Debug,Clone)]
pub struct Decomposition {
    pub intensity: GrayImage,

    /// None for grayscale input
    pub side: Option<SideChannels>,
}

impl Decomposition {
    pub fn is_grayscale (&self)->bool { self.side.is_none() }
}

/// split `img` into intensity and side channels according to `color_space`.
/// Grayscale images (single color channel) are not transformed, their only channel is the intensity.
pub fn decompose (img: &DynamicImage, color_space: ColorSpace)->Result<Decomposition> {
    check_not_empty( img, "decompose input")?;

    if !img.color().has_color() {
        let intensity = match img {
            DynamicImage::ImageLuma8(gray) => gray.clone(),
            _ => img.to_luma8()
        };
        return Ok( Decomposition{ intensity, side: None } )
    }

    let rgb = img.to_rgb8();
    let (w,h) = rgb.dimensions();

    let mut intensity = GrayImage::new( w, h);
    let mut first = GrayImage32f::new( w, h);
    let mut second = GrayImage32f::new( w, h);
    let mut residual = GrayImage32f::new( w, h);

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r,g,b] = pixel.0;
        let (i, c1, c2) = forward( color_space, r, g, b);
        let qi = quantize_u8( i);

        intensity.put_pixel( x, y, Luma([qi]));
        first.put_pixel( x, y, Luma([c1 as f32]));
        second.put_pixel( x, y, Luma([c2 as f32]));
        residual.put_pixel( x, y, Luma([(i - qi as f64) as f32]));
    }

    Ok( Decomposition{ intensity, side: Some( SideChannels{ first, second, residual }) } )
}

/// inverse of [`decompose`]. Without side channels this is the identity (returns a Luma8 image)
pub fn recompose (intensity: &GrayImage, side: Option<&SideChannels>, color_space: ColorSpace)->Result<DynamicImage> {
    check_not_empty( intensity, "recompose intensity")?;

    let Some(side) = side else {
        return Ok( DynamicImage::ImageLuma8( intensity.clone()) )
    };

    if intensity.dimensions() != side.dimensions()
        || side.second.dimensions() != side.dimensions()
        || side.residual.dimensions() != side.dimensions() {
        return Err( HiseqImageError::ShapeMismatch(
            format!("intensity {:?} does not match side channels {:?}", intensity.dimensions(), side.dimensions())))
    }

    let (w,h) = intensity.dimensions();
    let mut rgb = RgbImage::new( w, h);

    for (x, y, pixel) in intensity.enumerate_pixels() {
        let i = pixel.0[0] as f64 + side.residual.get_pixel( x, y).0[0] as f64;
        let c1 = side.first.get_pixel( x, y).0[0] as f64;
        let c2 = side.second.get_pixel( x, y).0[0] as f64;

        let (r, g, b) = inverse( color_space, i, c1, c2);
        rgb.put_pixel( x, y, Rgb([quantize_u8(r), quantize_u8(g), quantize_u8(b)]));
    }

    Ok( DynamicImage::ImageRgb8( rgb) )
}

/// BT.601 luma of an image, rounded to 8 bit. Grayscale images are returned as is
pub fn to_intensity (img: &DynamicImage)->GrayImage {
    if !img.color().has_color() {
        return match img {
            DynamicImage::ImageLuma8(gray) => gray.clone(),
            _ => img.to_luma8()
        }
    }

    let rgb = img.to_rgb8();
    ImageBuffer::from_fn( rgb.width(), rgb.height(), |x,y| {
        let [r,g,b] = rgb.get_pixel( x, y).0;
        Luma([quantize_u8( luma( r, g, b))])
    })
}

#[inline]
fn forward (color_space: ColorSpace, r: u8, g: u8, b: u8)->(f64,f64,f64) {
    match color_space {
        ColorSpace::YCrCb => rgb_to_ycrcb( r, g, b),
        ColorSpace::Hsv => {
            let (h,s,v) = rgb_to_hsv( r, g, b);
            (v, h, s)
        }
        ColorSpace::Lab => {
            let (l,a,bb) = rgb_to_lab( r, g, b);
            (l * LAB_INTENSITY_SCALE, a, bb)
        }
    }
}

#[inline]
fn inverse (color_space: ColorSpace, i: f64, c1: f64, c2: f64)->(f64,f64,f64) {
    match color_space {
        ColorSpace::YCrCb => ycrcb_to_rgb( i, c1, c2),
        ColorSpace::Hsv => hsv_to_rgb( c1, c2, i),
        ColorSpace::Lab => lab_to_rgb( i / LAB_INTENSITY_SCALE, c1, c2),
    }
}

/* #region YCrCb ******************************************************************************************************/

const KR: f64 = 0.299;
const KG: f64 = 0.587;
const KB: f64 = 0.114;
const CR_SCALE: f64 = 0.713;
const CB_SCALE: f64 = 0.564;
const CHROMA_OFFSET: f64 = 128.0;

#[inline(always)]
pub fn luma (r: u8, g: u8, b: u8)->f64 {
    KR * r as f64 + KG * g as f64 + KB * b as f64
}

/// returns (Y, Cr, Cb) with Y in [0,255] and chroma offset by 128
pub fn rgb_to_ycrcb (r: u8, g: u8, b: u8)->(f64,f64,f64) {
    let y = luma( r, g, b);
    let cr = (r as f64 - y) * CR_SCALE + CHROMA_OFFSET;
    let cb = (b as f64 - y) * CB_SCALE + CHROMA_OFFSET;
    (y, cr, cb)
}

/// exact algebraic inverse of [`rgb_to_ycrcb`] (not clamped)
pub fn ycrcb_to_rgb (y: f64, cr: f64, cb: f64)->(f64,f64,f64) {
    let r = y + (cr - CHROMA_OFFSET) / CR_SCALE;
    let b = y + (cb - CHROMA_OFFSET) / CB_SCALE;
    let g = (y - KR * r - KB * b) / KG;
    (r, g, b)
}

/* #endregion YCrCb */

/* #region HSV ********************************************************************************************************/

/// returns (hue in degrees [0,360), saturation [0,1], value [0,255])
pub fn rgb_to_hsv (r: u8, g: u8, b: u8)->(f64,f64,f64) {
    let r = r as f64;
    let g = g as f64;
    let b = b as f64;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h, s, max)
}

/// inverse of [`rgb_to_hsv`], `v` in [0,255]
pub fn hsv_to_rgb (h: f64, s: f64, v: f64)->(f64,f64,f64) {
    if s <= 0.0 {
        return (v, v, v)
    }

    let h6 = (h.rem_euclid( 360.0)) / 60.0;
    let sector = h6.floor();
    let f = h6 - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match (sector as i32).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q)
    }
}

/* #endregion HSV */

/* #region CIE L*a*b* *************************************************************************************************/

/// L* is in [0,100], the intensity channel maps it to [0,255]
const LAB_INTENSITY_SCALE: f64 = 255.0 / 100.0;

// D65 reference white
const XN: f64 = 0.95047;
const YN: f64 = 1.0;
const ZN: f64 = 1.08883;

const DELTA: f64 = 6.0 / 29.0;

#[inline]
fn srgb_to_linear (v: u8)->f64 {
    let c = v as f64 / 255.0;
    if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf( 2.4) }
}

/// returns sRGB in [0,255], input is clipped to the [0,1] gamut
#[inline]
fn linear_to_srgb (c: f64)->f64 {
    let c = c.clamp( 0.0, 1.0);
    let v = if c <= 0.0031308 { 12.92 * c } else { 1.055 * c.powf( 1.0 / 2.4) - 0.055 };
    v * 255.0
}

#[inline]
fn lab_f (t: f64)->f64 {
    if t > DELTA * DELTA * DELTA { t.cbrt() } else { t / (3.0 * pow2(DELTA)) + 4.0 / 29.0 }
}

#[inline]
fn lab_f_inv (f: f64)->f64 {
    if f > DELTA { f * f * f } else { 3.0 * pow2(DELTA) * (f - 4.0 / 29.0) }
}

/// returns (L* [0,100], a*, b*)
pub fn rgb_to_lab (r: u8, g: u8, b: u8)->(f64,f64,f64) {
    let rl = srgb_to_linear( r);
    let gl = srgb_to_linear( g);
    let bl = srgb_to_linear( b);

    let x = 0.4124564 * rl + 0.3575761 * gl + 0.1804375 * bl;
    let y = 0.2126729 * rl + 0.7151522 * gl + 0.0721750 * bl;
    let z = 0.0193339 * rl + 0.1191920 * gl + 0.9503041 * bl;

    let fx = lab_f( x / XN);
    let fy = lab_f( y / YN);
    let fz = lab_f( z / ZN);

    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// inverse of [`rgb_to_lab`], returns sRGB components in [0,255] (not rounded)
pub fn lab_to_rgb (l: f64, a: f64, b: f64)->(f64,f64,f64) {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let x = XN * lab_f_inv( fx);
    let y = YN * lab_f_inv( fy);
    let z = ZN * lab_f_inv( fz);

    let rl =  3.2404542 * x - 1.5371385 * y - 0.4985314 * z;
    let gl = -0.9692660 * x + 1.8760108 * y + 0.0415560 * z;
    let bl =  0.0556434 * x - 0.2040259 * y + 1.0572252 * z;

    (linear_to_srgb( rl), linear_to_srgb( gl), linear_to_srgb( bl))
}

/* #endregion CIE L*a*b* */
