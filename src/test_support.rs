//! Shared fixtures for unit tests.

use crate::data::{load_and_clean_data, Dataset};
use std::io::Write;
use tempfile::NamedTempFile;

/// Eight sales in the source file layout. The Airport West townhouse on row 4
/// has no price, row 5 lacks `Car` and the Alphington house lacks `Landsize`.
pub const SAMPLE_CSV: &str = "\
Suburb,Address,Rooms,Type,Price,Date,Distance,Bedroom2,Bathroom,Car,Landsize,BuildingArea,YearBuilt,CouncilArea,Lattitude,Longtitude,Regionname
Abbotsford,85 Turner St,2,h,1480000,3/12/2016,2.5,2,1,1,202,,,Yarra,-37.7996,144.9984,Northern Metropolitan
Abbotsford,25 Bloomburg St,2,h,1035000,4/02/2016,2.5,2,1,0,156,79,1900,Yarra,-37.8079,144.9934,Northern Metropolitan
Abbotsford,5 Charles St,3,h,1465000,4/03/2017,2.5,3,2,0,134,150,1900,Yarra,-37.8093,144.9944,Northern Metropolitan
Airport West,40 Federal St,3,t,,15/10/2016,13.5,3,2,1,0,,,Moonee Valley,-37.7176,144.8802,Western Metropolitan
Airport West,154 Halsey Rd,3,t,840000,7/11/2016,13.5,3,2,,303,225,2016,Moonee Valley,-37.718,144.878,Western Metropolitan
Albert Park,105 Kerferd Rd,2,u,700000,7/05/2016,3.3,2,1,1,0,,,Port Phillip,-37.8459,144.9555,Southern Metropolitan
Albert Park,85 Richardson St,2,h,1542000,12/11/2016,3.3,2,1,1,120,82,1900,Port Phillip,-37.845,144.9538,Southern Metropolitan
Alphington,6 Smith St,4,h,1600000,3/12/2016,6.4,3,2,2,,,,,-37.7707,145.0318,Northern Metropolitan
";

/// Three sales used for the suburb-mean and price-per-sqm scenario.
pub const SCENARIO_CSV: &str = "\
Suburb,Rooms,Type,Price,Date,Distance,Bedroom2,Bathroom,Car,Landsize,Lattitude,Longtitude,Regionname
A,3,h,500000,1/01/2017,5.0,3,1,1,0,-37.80,144.90,Northern Metropolitan
B,4,h,750000,1/02/2017,7.0,4,2,2,100,-37.81,144.91,Northern Metropolitan
A,2,u,300000,1/03/2017,5.0,2,1,1,50,-37.82,144.92,Northern Metropolitan
";

pub fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp csv");
    file.write_all(contents.as_bytes()).expect("write temp csv");
    file.flush().expect("flush temp csv");
    file
}

pub fn dataset_from(contents: &str) -> Dataset {
    let file = write_csv(contents);
    load_and_clean_data(file.path()).expect("fixture loads")
}

pub fn sample_dataset() -> Dataset {
    dataset_from(SAMPLE_CSV)
}

pub fn scenario_dataset() -> Dataset {
    dataset_from(SCENARIO_CSV)
}
