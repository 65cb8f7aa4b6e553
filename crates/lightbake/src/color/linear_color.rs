use std::ops;

use half::f16;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearColor {
    pub const BLACK: LinearColor = LinearColor { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: LinearColor = LinearColor { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> LinearColor {
        LinearColor { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> LinearColor {
        LinearColor { r, g, b, a: 1.0 }
    }

    /// Decodes an 8 bit sRGB color; alpha stays linear.
    pub fn from_srgb8(rgba: [u8; 4]) -> LinearColor {
        fn decode(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        LinearColor {
            r: decode(rgba[0]),
            g: decode(rgba[1]),
            b: decode(rgba[2]),
            a: rgba[3] as f32 / 255.0,
        }
    }

    pub fn from_f16_bits(rgba: [u16; 4]) -> LinearColor {
        LinearColor {
            r: f16::from_bits(rgba[0]).to_f32(),
            g: f16::from_bits(rgba[1]).to_f32(),
            b: f16::from_bits(rgba[2]).to_f32(),
            a: f16::from_bits(rgba[3]).to_f32(),
        }
    }

    pub fn to_f16_bits(&self) -> [u16; 4] {
        [
            f16::from_f32(self.r).to_bits(),
            f16::from_f32(self.g).to_bits(),
            f16::from_f32(self.b).to_bits(),
            f16::from_f32(self.a).to_bits(),
        ]
    }

    pub fn luminance(&self) -> f32 {
        self.r * 0.3 + self.g * 0.59 + self.b * 0.11
    }

    pub fn max_rgb(&self) -> f32 {
        f32::max(self.r, f32::max(self.g, self.b))
    }

    /// CIE XYZ of a linear sRGB color, returned in (r, g, b) = (X, Y, Z).
    pub fn linear_rgb_to_xyz(&self) -> LinearColor {
        LinearColor {
            r: 0.4124564 * self.r + 0.3575761 * self.g + 0.1804375 * self.b,
            g: 0.2126729 * self.r + 0.7151522 * self.g + 0.0721750 * self.b,
            b: 0.0193339 * self.r + 0.1191920 * self.g + 0.9503041 * self.b,
            a: self.a,
        }
    }

    /// Hue in degrees, saturation and value packed as (r, g, b).
    pub fn linear_rgb_to_hsv(&self) -> LinearColor {
        let rgb_min = f32::min(self.r, f32::min(self.g, self.b));
        let rgb_max = self.max_rgb();
        let rgb_range = rgb_max - rgb_min;

        let hue = if rgb_max == rgb_min {
            0.0
        } else if rgb_max == self.r {
            ((self.g - self.b) / rgb_range * 60.0 + 360.0) % 360.0
        } else if rgb_max == self.g {
            (self.b - self.r) / rgb_range * 60.0 + 120.0
        } else {
            (self.r - self.g) / rgb_range * 60.0 + 240.0
        };
        let saturation = if rgb_max == 0.0 { 0.0 } else { rgb_range / rgb_max };

        LinearColor::new(hue, saturation, rgb_max, self.a)
    }

    pub fn hsv_to_linear_rgb(&self) -> LinearColor {
        let (hue, saturation, value) = (self.r, self.g, self.b);
        let h_div_60 = hue / 60.0;
        let h_div_60_floor = h_div_60.floor();
        let fraction = h_div_60 - h_div_60_floor;

        let values = [
            value,
            value * (1.0 - saturation),
            value * (1.0 - fraction * saturation),
            value * (1.0 - (1.0 - fraction) * saturation),
        ];
        const SWIZZLE: [[usize; 3]; 6] = [
            [0, 3, 1],
            [2, 0, 1],
            [1, 0, 3],
            [1, 2, 0],
            [3, 1, 0],
            [0, 1, 2],
        ];
        let swizzle = SWIZZLE[(h_div_60_floor as i32).rem_euclid(6) as usize];
        LinearColor::new(values[swizzle[0]], values[swizzle[1]], values[swizzle[2]], self.a)
    }

    /// Scales saturation in HSV space, clamped to [0, 1].
    pub fn adjust_saturation(&self, factor: f32) -> LinearColor {
        let mut hsv = self.linear_rgb_to_hsv();
        hsv.g = (hsv.g * factor).clamp(0.0, 1.0);
        hsv.hsv_to_linear_rgb()
    }

    pub fn lerp(a: LinearColor, b: LinearColor, t: f32) -> LinearColor {
        a + (b - a) * t
    }

    pub fn clamp_non_negative(&self) -> LinearColor {
        LinearColor::new(self.r.max(0.0), self.g.max(0.0), self.b.max(0.0), self.a)
    }

    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }
}

impl ops::Add for LinearColor {
    type Output = LinearColor;
    fn add(self, rhs: Self) -> Self::Output {
        LinearColor::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl ops::AddAssign for LinearColor {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl ops::Sub for LinearColor {
    type Output = LinearColor;
    fn sub(self, rhs: Self) -> Self::Output {
        LinearColor::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b, self.a - rhs.a)
    }
}

// component-wise product
impl ops::Mul for LinearColor {
    type Output = LinearColor;
    fn mul(self, rhs: Self) -> Self::Output {
        LinearColor::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b, self.a * rhs.a)
    }
}

impl ops::MulAssign for LinearColor {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl ops::Mul<f32> for LinearColor {
    type Output = LinearColor;
    fn mul(self, rhs: f32) -> Self::Output {
        LinearColor::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

impl ops::MulAssign<f32> for LinearColor {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl ops::Div<f32> for LinearColor {
    type Output = LinearColor;
    fn div(self, rhs: f32) -> Self::Output {
        self * (1.0 / rhs)
    }
}
