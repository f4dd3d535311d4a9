//! Vector Document Module
//!
//! An SVG document builder. Compositors append descriptive markup; the
//! document finalizes to a string with a fixed viewBox, so no operation
//! can change the overall dimensions.

// == Vector Document ==
/// An SVG document under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    width: u32,
    height: u32,
    defs: Vec<String>,
    body: Vec<String>,
}

impl VectorDocument {
    // == Constructor ==
    /// Creates an empty document of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            defs: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    // == Markup Accumulation ==
    /// Appends markup to the `<defs>` section.
    pub fn push_def(&mut self, markup: String) {
        self.defs.push(markup);
    }

    /// Appends an element to the document body.
    pub fn push(&mut self, markup: String) {
        self.body.push(markup);
    }

    // == Finalize ==
    /// Renders the accumulated document to an SVG string.
    pub fn finish(&self) -> String {
        let mut result = String::new();
        result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
        result += &format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{0}\" height=\"{1}\" viewBox=\"0 0 {0} {1}\" stroke=\"none\">\n",
            self.width, self.height
        );
        if !self.defs.is_empty() {
            result += "<defs>";
            for def in &self.defs {
                result += def;
            }
            result += "</defs>\n";
        }
        for element in &self.body {
            result += element;
            result += "\n";
        }
        result += "</svg>\n";
        result
    }
}

// == Number Formatting ==
/// Formats a coordinate without a trailing fraction when it is integral.
pub fn fmt_num(value: f32) -> String {
    if (value - value.round()).abs() < 1e-4 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
    }
}
