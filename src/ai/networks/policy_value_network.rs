use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Actor-critic network with a shared trunk and two heads.
///
/// ```text
/// Input:  [batch, 768]     flattened 8x8x12 board planes
/// FC1:    768 -> 128, ReLU
/// FC2:    128 -> 128, ReLU
/// Policy head: 128 -> 20480  (logits, one per action index)
/// Value head:  128 -> 1      (state value estimate)
/// ```
///
/// No masking or normalisation happens here.
#[derive(Module, Debug)]
pub struct PolicyValueNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    policy_head: Linear<B>,
    value_head: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct PolicyValueNetworkConfig {
    #[config(default = 768)]
    pub input_size: usize,
    #[config(default = 128)]
    pub hidden_size: usize,
    #[config(default = 20480)]
    pub action_space: usize,
}

impl PolicyValueNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PolicyValueNetwork<B> {
        PolicyValueNetwork {
            fc1: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
            policy_head: LinearConfig::new(self.hidden_size, self.action_space).init(device),
            value_head: LinearConfig::new(self.hidden_size, 1).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> PolicyValueNetwork<B> {
    /// Forward pass: input [batch, 768] -> (logits [batch, 20480], value [batch, 1]).
    pub fn forward(&self, input: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let x = self.relu.forward(self.fc1.forward(input));
        let x = self.relu.forward(self.fc2.forward(x));

        let logits = self.policy_head.forward(x.clone());
        let value = self.value_head.forward(x);

        (logits, value)
    }

    #[cfg(test)]
    pub(crate) fn heads(&self) -> (&Linear<B>, &Linear<B>) {
        (&self.policy_head, &self.value_head)
    }

    /// Name and shape of every parameter tensor, in a fixed order.
    pub fn parameter_shapes(&self) -> Vec<(String, Vec<usize>)> {
        let layers = [
            ("fc1", &self.fc1),
            ("fc2", &self.fc2),
            ("policy_head", &self.policy_head),
            ("value_head", &self.value_head),
        ];
        let mut shapes = Vec::with_capacity(layers.len() * 2);
        for (name, layer) in layers {
            shapes.push((format!("{name}.weight"), layer.weight.val().dims().to_vec()));
            if let Some(bias) = &layer.bias {
                shapes.push((format!("{name}.bias"), bias.val().dims().to_vec()));
            }
        }
        shapes
    }
}
