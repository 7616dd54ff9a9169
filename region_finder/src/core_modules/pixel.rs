// THEORY:
// The `Pixel` module is the most fundamental unit of the region finder. It is a
// "dumb" data container for the color of a single pixel plus the one comparison the
// rest of the system cares about: "is this color close enough to the target?"
//
// Key architectural principles:
// 1.  **RGB only**: A `Color` carries red, green and blue. Alpha is dropped on the way
//     in, because it never takes part in a comparison.
// 2.  **Per-channel similarity**: `color_match` is a Chebyshev-style test. Each channel
//     is compared independently against the same threshold; the differences are never
//     summed or squared. A color that is off by exactly the threshold in one channel
//     still matches.
// 3.  **Injected randomness**: `Color::random` takes the generator as a parameter, so the
//     visualization layer can be driven by a seeded source in tests.

pub mod pixel {
    use image::{Rgb, Rgba};
    use rand::Rng;

    pub type Channel = u8;
    pub type ColorDiff = u8;

    /// How far (per channel, out of 255) a color may drift from the target and still match.
    pub const DEFAULT_MAX_COLOR_DIFF: ColorDiff = 19;

    /// A "dumb" data container representing a single RGB color.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Color {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Color {
        pub const BLACK: Color = Color::new(0, 0, 0);
        pub const WHITE: Color = Color::new(255, 255, 255);
        pub const BLUE: Color = Color::new(0, 0, 255);

        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        /// Draws one color uniformly from the full RGB cube.
        pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
            let [red, green, blue] = rng.random::<[u8; 3]>();
            Self { red, green, blue }
        }

        /// The largest absolute per-channel difference between two colors.
        pub fn max_channel_diff(&self, other: &Color) -> ColorDiff {
            self.red
                .abs_diff(other.red)
                .max(self.green.abs_diff(other.green))
                .max(self.blue.abs_diff(other.blue))
        }

        /// An opaque RGBA pixel carrying this color.
        pub fn to_rgba(self) -> Rgba<u8> {
            Rgba([self.red, self.green, self.blue, u8::MAX])
        }
    }

    impl From<Rgba<u8>> for Color {
        fn from(pixel: Rgba<u8>) -> Self {
            let [red, green, blue, _alpha] = pixel.0;
            Self { red, green, blue }
        }
    }

    impl From<&Rgba<u8>> for Color {
        fn from(pixel: &Rgba<u8>) -> Self {
            Self::from(*pixel)
        }
    }

    impl From<Rgb<u8>> for Color {
        fn from(pixel: Rgb<u8>) -> Self {
            let [red, green, blue] = pixel.0;
            Self { red, green, blue }
        }
    }

    impl From<Color> for Rgba<u8> {
        fn from(color: Color) -> Self {
            color.to_rgba()
        }
    }

    /// True iff every channel of `c1` is within `max_color_diff` of the same channel of `c2`.
    pub fn color_match(c1: &Color, c2: &Color, max_color_diff: ColorDiff) -> bool {
        c1.red.abs_diff(c2.red) <= max_color_diff
            && c1.green.abs_diff(c2.green) <= max_color_diff
            && c1.blue.abs_diff(c2.blue) <= max_color_diff
    }
}
