#![no_main]

use libfuzzer_sys::fuzz_target;
use snapsheet_core::geometry::SheetMeasurement;
use snapsheet_core::options::SheetOptions;
use snapsheet_web::WebSheet;
use snapsheet_web::input_parser::{parse_host_input, parse_host_inputs};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut sheet = WebSheet::new(
        SheetOptions::new(vec![0.3, 0.6, 0.9]).with_open(true),
        SheetMeasurement::container(1000.0, 1000.0),
    );
    sheet.mount();

    // Parse errors are fine; panics are not.
    if let Ok(Some(input)) = parse_host_input(text) {
        sheet.dispatch(input);
    }
    if let Ok(inputs) = parse_host_inputs(text) {
        for input in inputs.into_iter().take(256) {
            sheet.dispatch(input);
        }
    }

    let style = sheet.style();
    assert!(style.transform.starts_with("translate3d(0, "));
});
