use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::{MseLoss, Reduction},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
        PositionalEncoding, PositionalEncodingConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ScoreRegressorConfig {
    /// Length of the standardized numeric feature vector (F)
    pub numeric_width: usize,
    /// Embedding-table sizes, one per categorical column in
    /// schema order. The token sequence length is 1 + len().
    pub vocab_sizes: Vec<usize>,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
}

impl ScoreRegressorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ScoreRegressor<B> {
        let numeric_proj = LinearConfig::new(self.numeric_width, self.d_model).init(device);
        let embeddings: Vec<Embedding<B>> = self
            .vocab_sizes
            .iter()
            .map(|&vocab| EmbeddingConfig::new(vocab, self.d_model).init(device))
            .collect();
        // Sinusoidal encoding over the (short) feature-token sequence.
        // The features form an unordered bag; the positional signal only
        // breaks the symmetry between tokens, it encodes no true order.
        let pos_encoding = PositionalEncodingConfig::new(self.d_model)
            .with_max_sequence_size(1 + self.vocab_sizes.len())
            .init(device);
        let blocks: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let head_hidden = LinearConfig::new(self.d_model, 2 * self.d_model).init(device);
        let head_out    = LinearConfig::new(2 * self.d_model, 1).init(device);
        let dropout     = DropoutConfig::new(self.dropout).init();
        ScoreRegressor {
            numeric_proj, embeddings, pos_encoding,
            blocks, head_hidden, head_out, dropout,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { norm1, self_attn, norm2, ffn_linear1, ffn_linear2, dropout }
    }
}

/// One pre-normalization encoder block:
///   x = x + dropout(attn(norm1(x)))
///   x = x + dropout(ffn(norm2(x)))
/// Attention is full — every token attends to every token.
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub norm1:       LayerNorm<B>,
    pub self_attn:   MultiHeadAttention<B>,
    pub norm2:       LayerNorm<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attn_out = self
            .self_attn
            .forward(MhaInput::self_attn(self.norm1.forward(x.clone())))
            .context;
        let x = x + self.dropout.forward(attn_out);
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(self.norm2.forward(x.clone())))
        );
        x + self.dropout.forward(ffn_out)
    }
}

#[derive(Module, Debug)]
pub struct ScoreRegressor<B: Backend> {
    pub numeric_proj: Linear<B>,
    pub embeddings:   Vec<Embedding<B>>,
    pub pos_encoding: PositionalEncoding<B>,
    pub blocks:       Vec<EncoderBlock<B>>,
    pub head_hidden:  Linear<B>,
    pub head_out:     Linear<B>,
    pub dropout:      Dropout,
}

impl<B: Backend> ScoreRegressor<B> {
    /// Build the feature-token sequence for a batch.
    ///
    /// numeric: [batch, F], categorical: [batch, C]
    /// → tokens: [batch, 1 + C, d_model]
    ///
    /// The numeric token always comes first, then one token per
    /// categorical column in schema order. The order must be stable
    /// across calls — the positional signal depends on it.
    pub fn embed_features(
        &self,
        numeric:     Tensor<B, 2>,
        categorical: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let [batch_size, _] = numeric.dims();

        let mut tokens: Vec<Tensor<B, 3>> = Vec::with_capacity(1 + self.embeddings.len());

        // The whole numeric vector becomes a single token
        tokens.push(self.numeric_proj.forward(numeric).unsqueeze_dim::<3>(1));

        // One token per categorical column, looked up by id
        for (col, embedding) in self.embeddings.iter().enumerate() {
            let ids = categorical.clone().slice([0..batch_size, col..col + 1]);
            tokens.push(embedding.forward(ids));
        }

        let tokens = Tensor::cat(tokens, 1);
        let tokens = self.pos_encoding.forward(tokens);
        self.dropout.forward(tokens)
    }

    /// numeric: [batch, F], categorical: [batch, C] → predictions: [batch]
    pub fn forward(
        &self,
        numeric:     Tensor<B, 2>,
        categorical: Tensor<B, 2, Int>,
    ) -> Tensor<B, 1> {
        let mut x = self.embed_features(numeric, categorical);
        for block in &self.blocks {
            x = block.forward(x);
        }

        // Mean-pool the token sequence to one vector per sample
        let pooled = x.mean_dim(1).squeeze::<2>(1); // [batch, d_model]

        // Two-layer regression head → one unconstrained scalar
        let hidden = burn::tensor::activation::relu(self.head_hidden.forward(pooled));
        let hidden = self.dropout.forward(hidden);
        self.head_out.forward(hidden).squeeze::<1>(1)
    }

    pub fn forward_loss(
        &self,
        numeric:     Tensor<B, 2>,
        categorical: Tensor<B, 2, Int>,
        targets:     Tensor<B, 1>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>)
    where
        B: AutodiffBackend,
    {
        let predictions = self.forward(numeric, categorical);
        let loss = MseLoss::new().forward(predictions.clone(), targets, Reduction::Mean);
        (loss, predictions)
    }
}
