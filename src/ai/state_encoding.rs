use burn::prelude::*;
use burn::tensor::TensorData;

use crate::game::{Color, Position};

pub const RANKS: usize = 8;
pub const FILES: usize = 8;
/// One plane per (piece type, colour): white P N B R Q K, then black.
pub const PLANES: usize = 12;
/// Length of the flattened state vector fed to the network.
pub const STATE_SIZE: usize = RANKS * FILES * PLANES;

/// A position as an 8x8x12 rank-major binary tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedState {
    data: [f32; STATE_SIZE],
}

impl EncodedState {
    pub fn get(&self, rank: usize, file: usize, plane: usize) -> f32 {
        self.data[offset(rank, file, plane)]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Tensor of shape [8, 8, 12].
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 3> {
        Tensor::<B, 1>::from_data(TensorData::from(self.data.as_slice()), device)
            .reshape([RANKS, FILES, PLANES])
    }

    /// Flattened network input of shape [1, 768].
    pub fn to_input<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_data(TensorData::from(self.data.as_slice()), device)
            .reshape([1, STATE_SIZE])
    }
}

/// Encode a position. Square index `rank * 8 + file` maps to (rank, file).
pub fn encode_position(position: &Position) -> EncodedState {
    let mut data = [0.0f32; STATE_SIZE];
    for index in 0..(RANKS * FILES) as u8 {
        if let Some((piece, color)) = position.piece_at(index) {
            let plane = piece.to_index() + if color == Color::White { 0 } else { 6 };
            let (rank, file) = (index as usize / FILES, index as usize % FILES);
            data[offset(rank, file, plane)] = 1.0;
        }
    }
    EncodedState { data }
}

fn offset(rank: usize, file: usize, plane: usize) -> usize {
    (rank * FILES + file) * PLANES + plane
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Move;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_encode_initial_position() {
        let state = encode_position(&Position::initial());
        let occupied: f32 = state.as_slice().iter().sum();
        assert_eq!(occupied, 32.0);

        // White pawn on e2, white king on e1
        assert_eq!(state.get(1, 4, 0), 1.0);
        assert_eq!(state.get(0, 4, 5), 1.0);
        // Black king on e8, black queen on d8
        assert_eq!(state.get(7, 4, 11), 1.0);
        assert_eq!(state.get(7, 3, 10), 1.0);
        // Empty square e4
        for plane in 0..PLANES {
            assert_eq!(state.get(3, 4, plane), 0.0);
        }
    }

    #[test]
    fn test_one_plane_per_occupied_square() {
        let position = Position::initial()
            .push(&Move::from_uci("e2e4").unwrap())
            .unwrap();
        let state = encode_position(&position);
        for rank in 0..RANKS {
            for file in 0..FILES {
                let set: f32 = (0..PLANES).map(|p| state.get(rank, file, p)).sum();
                let occupied = position.piece_at((rank * FILES + file) as u8).is_some();
                assert_eq!(set, if occupied { 1.0 } else { 0.0 });
            }
        }
        assert_eq!(state.get(3, 4, 0), 1.0);
        assert_eq!(state.get(1, 4, 0), 0.0);
    }

    #[test]
    fn test_tensor_shapes() {
        let device = Default::default();
        let state = encode_position(&Position::initial());
        assert_eq!(state.to_tensor::<TestBackend>(&device).shape().dims, [8, 8, 12]);
        assert_eq!(state.to_input::<TestBackend>(&device).shape().dims, [1, 768]);
    }

    #[test]
    fn test_tensor_matches_rank_major_layout() {
        let device = Default::default();
        let state = encode_position(&Position::initial());
        let data: Vec<f32> = state
            .to_tensor::<TestBackend>(&device)
            .into_data()
            .to_vec()
            .unwrap();
        assert_eq!(data.as_slice(), state.as_slice());
    }
}
