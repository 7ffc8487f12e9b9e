//! Basic usage of the `dyn_array` crate:
//!
//! * Creating an array.
//! * Adding items, watching the capacity grow.
//! * Inserting and removing in the middle.
//! * Reserving and resizing.

use dyn_array::DynamicArray;

fn main() {
    let mut array = DynamicArray::new();

    // Capacity doubles whenever a push finds the array full.
    for name in ["Alice", "Bob", "Charlie", "Dave", "Eve"] {
        array.push(name.to_string());

        println!(
            "Array contains {} items, with a capacity of {}",
            array.len(),
            array.capacity()
        );
    }

    // Inserting shifts the following items towards the end.
    let inserted = array.insert(1, "Zed".to_string());
    inserted.push_str(" (inserted)");
    println!("After insert: {array:?}");

    // Erasing shifts them back and hands the removed item to us.
    if let Some(removed) = array.erase(0) {
        println!("Erased item: {removed}");
    }

    // The array is a slice for reading and writing.
    array.sort();
    println!("Sorted: {array:?}");

    // Reserving allocates exactly what was asked for.
    array.reserve(32);
    println!("Capacity after reserve: {}", array.capacity());

    // Resizing fills with default values or drops the excess.
    array.resize(8);
    println!("After growing resize: {array:?}");

    array.resize(2);
    println!("After shrinking resize: {array:?}");
}
