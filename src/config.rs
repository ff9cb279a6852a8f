use crate::frame::ResizeFilter;
use crate::segmentation::RefineStrategy;

/// Settings for a [`BackgroundCompositor`](crate::compose::BackgroundCompositor)
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// When false every frame is passed through untouched
    pub replace_background: bool,
    pub refine: RefineStrategy,
    pub resize_filter: ResizeFilter,
    /// Composite rows on the rayon pool
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            replace_background: true,
            refine: RefineStrategy::LabelMatch,
            resize_filter: ResizeFilter::Bilinear,
            parallel: false,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    replace_background: Option<bool>,
    refine: Option<RefineStrategy>,
    resize_filter: Option<ResizeFilter>,
    parallel: Option<bool>,
}

impl PipelineConfigBuilder {
    pub fn replace_background(mut self, replace: bool) -> Self {
        self.replace_background = Some(replace);
        self
    }

    pub fn refine(mut self, refine: RefineStrategy) -> Self {
        self.refine = Some(refine);
        self
    }

    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = Some(filter);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            replace_background: self
                .replace_background
                .unwrap_or(default.replace_background),
            refine: self.refine.unwrap_or(default.refine),
            resize_filter: self.resize_filter.unwrap_or(default.resize_filter),
            parallel: self.parallel.unwrap_or(default.parallel),
        }
    }
}
