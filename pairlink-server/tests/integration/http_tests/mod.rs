mod test_description_slots;
