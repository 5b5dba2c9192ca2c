//! Observation for [`AtariEnv`](crate::AtariEnv).
use blob_dqn_core::Obs;

#[derive(Debug, Clone, PartialEq)]
/// Stacked grayscale frames with an optional auxiliary vector.
pub struct AtariObs {
    /// Frames of shape `[C, H, W]`, oldest frame first.
    pub frames: Vec<u8>,

    /// `[C, H, W]`.
    pub shape: [usize; 3],

    /// Auxiliary features, empty if the backend supplies none.
    pub aux: Vec<f32>,
}

impl Obs for AtariObs {}

#[cfg(feature = "tch")]
mod tch_input {
    use super::AtariObs;
    use blob_dqn_tch_agent::qnet::{PixelInput, StackObs};
    use tch::Tensor;

    impl StackObs for AtariObs {
        type Input = PixelInput;

        fn stack(obs: &[Self]) -> PixelInput {
            let n = obs.len() as i64;
            let [c, h, w] = obs.first().map_or([0, 0, 0], |o| o.shape);
            let aux_dim = obs.first().map_or(0, |o| o.aux.len()) as i64;
            let frames = obs
                .iter()
                .flat_map(|o| o.frames.iter().copied())
                .collect::<Vec<_>>();
            let aux = obs
                .iter()
                .flat_map(|o| o.aux.iter().copied())
                .collect::<Vec<_>>();

            PixelInput {
                pixels: Tensor::from_slice(&frames).view([n, c as i64, h as i64, w as i64]),
                aux: Tensor::from_slice(&aux).view([n, aux_dim]),
            }
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn test_stack_shapes() {
            let obs = AtariObs {
                frames: vec![7; 3 * 21 * 16],
                shape: [3, 21, 16],
                aux: vec![0.5; 4],
            };
            let input = AtariObs::stack(&[obs.clone(), obs]);
            assert_eq!(input.pixels.size(), [2, 3, 21, 16]);
            assert_eq!(input.pixels.kind(), tch::Kind::Uint8);
            assert_eq!(input.aux.size(), [2, 4]);
        }
    }
}
