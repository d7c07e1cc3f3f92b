use std::io::Write;

use anyhow::{Context, Result};
use handlebars::handlebars_helper;

use crate::recover::Summary;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

pub fn write_summaries<W: Write>(mut dst: W, summaries: &[Summary], format: &Format) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut dst, summaries).context("serializing to json")?;
            writeln!(dst).context("writing summary")
        }
        Format::Text => {
            let data = render_text(summaries).context("serializing summary")?;
            dst.write_all(data.as_bytes()).context("writing summary")
        }
    }
}

fn render_text(summaries: &[Summary]) -> Result<String> {
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);

    handlebars_helper!(percent: |part: u64, whole: u64| {
        if whole == 0 {
            "0.0%".to_string()
        } else {
            #[allow(clippy::cast_precision_loss)]
            let pct = part as f64 / whole as f64 * 100.0;
            format!("{pct:.1}%")
        }
    });
    hb.register_helper("percent", Box::new(percent));
    hb.register_template_string("summary", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("summary", &summaries).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ #each this }}{{ input }}
===============================================================================
Output:            {{ #if output }}{{ output }}{{ else }}-{{ /if }}
Samples:           {{ samples }}
Channel 0 high:    {{ ch0_high }} ({{ percent ch0_high samples }})
Channel 1 high:    {{ ch1_high }} ({{ percent ch1_high samples }})
Markers:           {{ markers }}
Decoded bits:      {{ bits }}
Dropped intervals: {{ dropped }}
Frames:            {{ frames }}
Frame bits:        {{ total_frame_bits }} (min {{ min_frame_bits }}, max {{ max_frame_bits }})
Frames with gaps:  {{ frames_with_gaps }}
Partial matches:   {{ partial_matches }}
Result:            {{ description }}

{{ /each }}";
